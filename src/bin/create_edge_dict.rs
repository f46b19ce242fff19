use edgedict::cli::commands::{parse_or_exit, run_create};
use edgedict::cli::logging::setup_logging;
use edgedict::cli::{output, CreateCli};

fn main() {
    let cli: CreateCli = parse_or_exit();

    setup_logging(cli.common.debug);

    if let Err(e) = run_create(&cli) {
        output::error(&e);
        std::process::exit(e.exit_code());
    }
}
