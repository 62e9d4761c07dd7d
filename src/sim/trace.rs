use smallvec::{smallvec, SmallVec};
use std::collections::VecDeque;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use crate::cache::AccessKind;
use crate::error::TraceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceRecord {
    pub address: u64,
    pub kind: AccessKind,
}

impl TraceRecord {
    pub fn new(address: u64, kind: AccessKind) -> Self {
        Self { address, kind }
    }
}

type Records = SmallVec<[TraceRecord; 2]>;

fn parse_address(token: &str, line: usize) -> Result<u64, TraceError> {
    let parsed = match token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
    {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => token.parse::<u64>(),
    };
    parsed.map_err(|err| TraceError::Malformed {
        line,
        reason: format!("bad address '{token}': {err}"),
    })
}

fn parse_kind(token: &str, line: usize) -> Result<AccessKind, TraceError> {
    token
        .parse()
        .map_err(|source| TraceError::Reference { line, source })
}

/// Parses one trace line into zero, one or two records.
///
/// Accepted forms:
/// - `<kind> <addr>`
/// - `<pc> <kind> <addr>`: an instruction fetch at `pc`, then the data
///   reference unless `kind` is `-`.
pub fn parse_line(text: &str, line: usize) -> Result<Records, TraceError> {
    let text = text.split('#').next().unwrap_or("").trim();
    let tokens: SmallVec<[&str; 3]> = text.split_whitespace().collect();
    match tokens.as_slice() {
        [] => Ok(SmallVec::new()),
        [kind, addr] => Ok(smallvec![TraceRecord::new(
            parse_address(addr, line)?,
            parse_kind(kind, line)?,
        )]),
        [pc, kind, addr] => {
            let fetch = TraceRecord::new(parse_address(pc, line)?, AccessKind::Instruction);
            if *kind == "-" {
                return Ok(smallvec![fetch]);
            }
            let data = TraceRecord::new(parse_address(addr, line)?, parse_kind(kind, line)?);
            if !data.kind.is_data() {
                return Err(TraceError::Malformed {
                    line,
                    reason: format!("expected L, S or - as data kind, got '{kind}'"),
                });
            }
            Ok(smallvec![fetch, data])
        }
        _ => Err(TraceError::Malformed {
            line,
            reason: format!("expected 2 or 3 fields, got {}", tokens.len()),
        }),
    }
}

/// Streams [`TraceRecord`]s out of a line-oriented text trace.
pub struct TraceReader<R> {
    lines: io::Lines<R>,
    line: usize,
    pending: VecDeque<TraceRecord>,
}

impl<R: BufRead> TraceReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line: 0,
            pending: VecDeque::new(),
        }
    }
}

impl TraceReader<Box<dyn BufRead>> {
    /// Opens `path`, or stdin when `path` is `-`.
    pub fn open(path: &Path) -> Result<Self, TraceError> {
        let reader: Box<dyn BufRead> = if path == Path::new("-") {
            Box::new(BufReader::new(io::stdin()))
        } else {
            Box::new(BufReader::new(File::open(path)?))
        };
        Ok(Self::new(reader))
    }
}

impl<R: BufRead> Iterator for TraceReader<R> {
    type Item = Result<TraceRecord, TraceError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(record) = self.pending.pop_front() {
                return Some(Ok(record));
            }
            let text = match self.lines.next()? {
                Ok(text) => text,
                Err(err) => return Some(Err(err.into())),
            };
            self.line += 1;
            match parse_line(&text, self.line) {
                Ok(records) => self.pending.extend(records),
                Err(err) => return Some(Err(err)),
            }
        }
    }
}
