use anyhow::{bail, Context};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::cache::AccessKind;
use crate::sim::trace::TraceRecord;
use crate::traffic::config::{TrafficConfig, TrafficPatternSpec};

#[derive(Debug, Clone, PartialEq, Eq)]
enum PatternKind {
    Strided { stride: u64 },
    Random { min: u64, max: u64, seed: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledPattern {
    pub name: String,
    pub op: AccessKind,
    base: u64,
    count: u32,
    repeat: u32,
    kind: PatternKind,
}

impl CompiledPattern {
    /// One pass over the stream, before `repeat` is applied.
    fn addresses(&self) -> Vec<u64> {
        match self.kind {
            PatternKind::Strided { stride } => (0..self.count as u64)
                .map(|i| self.base.wrapping_add(i.wrapping_mul(stride)))
                .collect(),
            PatternKind::Random { min, max, seed } => {
                let mut rng = StdRng::seed_from_u64(seed);
                (0..self.count)
                    .map(|_| self.base.wrapping_add(rng.gen_range(min..max)))
                    .collect()
            }
        }
    }

    pub fn records(&self) -> impl Iterator<Item = TraceRecord> + '_ {
        let pass = self.addresses();
        let op = self.op;
        (0..self.repeat).flat_map(move |_| {
            pass.clone()
                .into_iter()
                .map(move |addr| TraceRecord::new(addr, op))
        })
    }

    pub fn len(&self) -> usize {
        self.count as usize * self.repeat as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Compiled synthetic traffic; replays its patterns back to back.
#[derive(Debug, Clone, Default)]
pub struct PatternEngine {
    patterns: Vec<CompiledPattern>,
}

impl PatternEngine {
    pub fn new(config: &TrafficConfig) -> anyhow::Result<Self> {
        let patterns = config
            .patterns
            .iter()
            .enumerate()
            .map(|(idx, spec)| {
                compile_pattern(spec).with_context(|| format!("traffic pattern {idx}"))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn pattern(&self, idx: usize) -> Option<&CompiledPattern> {
        self.patterns.get(idx)
    }

    pub fn records(&self) -> impl Iterator<Item = TraceRecord> + '_ {
        self.patterns.iter().flat_map(|p| p.records())
    }
}

fn compile_pattern(spec: &TrafficPatternSpec) -> anyhow::Result<CompiledPattern> {
    let op = parse_op(&spec.op)?;
    let kind = match spec.kind.trim().to_ascii_lowercase().as_str() {
        "sequential" => PatternKind::Strided { stride: 4 },
        "strided" => PatternKind::Strided { stride: spec.stride },
        "random" => {
            if spec.random_max <= spec.random_min {
                bail!(
                    "random range [{}, {}) is empty",
                    spec.random_min,
                    spec.random_max
                );
            }
            PatternKind::Random {
                min: spec.random_min,
                max: spec.random_max,
                seed: spec.seed,
            }
        }
        other => bail!("unsupported pattern kind '{other}' (expected sequential|strided|random)"),
    };
    let name = if spec.name.is_empty() {
        default_pattern_name(&kind, op)
    } else {
        spec.name.clone()
    };
    Ok(CompiledPattern {
        name,
        op,
        base: spec.base,
        count: spec.count,
        repeat: spec.repeat,
        kind,
    })
}

fn parse_op(op: &str) -> anyhow::Result<AccessKind> {
    match op.trim().to_ascii_lowercase().as_str() {
        "instr" | "fetch" | "i" => Ok(AccessKind::Instruction),
        "load" | "read" | "r" | "l" => Ok(AccessKind::DataLoad),
        "store" | "write" | "w" | "s" => Ok(AccessKind::DataStore),
        other => bail!("unsupported traffic op '{other}'; expected instr/load/store"),
    }
}

fn default_pattern_name(kind: &PatternKind, op: AccessKind) -> String {
    let base = match kind {
        PatternKind::Strided { stride } => format!("strided({stride})"),
        PatternKind::Random { seed, .. } => format!("random({seed})"),
    };
    format!("{}_{}", base, op.short().to_ascii_lowercase())
}
