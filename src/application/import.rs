//! CSV import reader
//!
//! Turns a byte stream into a lazy, forward-only sequence of [`ImportRow`]s.
//! Records have no header, keep surrounding whitespace, and must all have the
//! same number of fields as the first record.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::{self, Read};
use std::rc::Rc;

use csv::{ReaderBuilder, StringRecordsIntoIter, Trim};

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::ImportRow;

/// Physical line bookkeeping for the bytes read so far.
///
/// csv positions do not count skipped blank lines, and a record's position
/// may point at the blank lines before it. A record therefore starts on the
/// line of the first content byte at or after its position. Lookups must
/// come in increasing offset order; older entries are dropped.
#[derive(Debug)]
struct LineIndex {
    line: u64,
    line_has_content: bool,
    /// (offset of the first content byte of a line, its 1-based line number)
    starts: VecDeque<(u64, u64)>,
}

impl LineIndex {
    fn new() -> Self {
        Self {
            line: 1,
            line_has_content: false,
            starts: VecDeque::new(),
        }
    }

    fn observe(&mut self, offset: u64, byte: u8) {
        match byte {
            b'\n' => {
                self.line += 1;
                self.line_has_content = false;
            }
            b'\r' => {}
            _ if !self.line_has_content => {
                self.line_has_content = true;
                self.starts.push_back((offset, self.line));
            }
            _ => {}
        }
    }

    /// 1-based line of the record whose position is `byte`.
    fn line_at(&mut self, byte: u64) -> u64 {
        let before = self.starts.partition_point(|&(start, _)| start < byte);
        self.starts.drain(..before);
        self.starts
            .front()
            .map(|&(_, line)| line)
            .unwrap_or(self.line)
    }
}

/// Reader that feeds every byte it passes on into a shared [`LineIndex`].
struct LineTracking<R> {
    inner: R,
    offset: u64,
    index: Rc<RefCell<LineIndex>>,
}

impl<R: Read> Read for LineTracking<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        let mut index = self.index.borrow_mut();
        for (i, &byte) in buf[..n].iter().enumerate() {
            index.observe(self.offset + i as u64, byte);
        }
        self.offset += n as u64;
        Ok(n)
    }
}

/// Iterator over the rows of an import file.
pub struct ImportRows<R: Read> {
    records: StringRecordsIntoIter<LineTracking<R>>,
    index: Rc<RefCell<LineIndex>>,
}

impl<R: Read> ImportRows<R> {
    pub fn new(input: R) -> Self {
        let index = Rc::new(RefCell::new(LineIndex::new()));
        let reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(false)
            .trim(Trim::None)
            .from_reader(LineTracking {
                inner: input,
                offset: 0,
                index: index.clone(),
            });
        Self {
            records: reader.into_records(),
            index,
        }
    }

    fn line_at(&self, byte: u64) -> u64 {
        self.index.borrow_mut().line_at(byte)
    }
}

impl<R: Read> Iterator for ImportRows<R> {
    type Item = ApplicationResult<ImportRow>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = match self.records.next()? {
            Ok(record) => record,
            Err(source) => {
                let line = source.position().map(|p| self.line_at(p.byte()));
                return Some(Err(ApplicationError::Parse { line, source }));
            }
        };
        let line = record
            .position()
            .map(|p| self.line_at(p.byte()))
            .unwrap_or_default();
        let fields = record.iter().map(str::to_string).collect();
        Some(ImportRow::new(line, fields).map_err(Into::into))
    }
}
