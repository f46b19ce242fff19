use edgedict::cli::commands::{parse_or_exit, run_load};
use edgedict::cli::logging::setup_logging;
use edgedict::cli::{output, LoadCli};

fn main() {
    let cli: LoadCli = parse_or_exit();

    setup_logging(cli.common.debug);

    if let Err(e) = run_load(&cli) {
        output::error(&e);
        std::process::exit(e.exit_code());
    }
}
