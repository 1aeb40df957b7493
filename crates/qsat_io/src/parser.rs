//! Parser for Stim detector error model (.dem) files.
//!
//! Each line is split into an instruction head (name, optional `[tag]`,
//! optional parenthesized arguments) and a list of targets, then the
//! resulting program is executed with `repeat` blocks fully unrolled.
//! Detector indices and coordinates are resolved against the running
//! `shift_detectors` offsets, so the returned model only contains absolute
//! detector ids.

use anyhow::{Context, Result, anyhow, bail};
use nom::{
    IResult,
    branch::alt,
    bytes::complete::{take_until, take_while1},
    character::complete::{char, space0, space1, u64 as decimal},
    combinator::{all_consuming, map, opt},
    multi::separated_list0,
    number::complete::double,
    sequence::{delimited, preceded, terminated, tuple},
};
use qsat_core::{Coord, ErrorMechanism, ErrorModel};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Upper bound on unrolled work. Every executed instruction and every
/// `repeat` iteration counts as one step, so empty blocks are bounded too.
const MAX_EXPANDED_STEPS: u64 = 50_000_000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Target {
    Detector(u64),
    Observable(u64),
    Separator,
    Number(u64),
}

#[derive(Clone, Debug, PartialEq)]
struct Instruction<'a> {
    name: &'a str,
    args: Vec<f64>,
    targets: Vec<Target>,
    opens_block: bool,
}

#[derive(Debug, PartialEq)]
enum Line<'a> {
    Instruction(Instruction<'a>),
    CloseBlock,
}

#[derive(Debug)]
enum Item<'a> {
    Single(usize, Instruction<'a>),
    Repeat {
        line: usize,
        count: u64,
        body: Vec<Item<'a>>,
    },
}

fn name(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii_alphanumeric() || c == '_')(input)
}

fn tag(input: &str) -> IResult<&str, &str> {
    delimited(char('['), take_until("]"), char(']'))(input)
}

fn args(input: &str) -> IResult<&str, Vec<f64>> {
    delimited(
        char('('),
        separated_list0(char(','), delimited(space0, double, space0)),
        char(')'),
    )(input)
}

fn target(input: &str) -> IResult<&str, Target> {
    alt((
        map(preceded(char('D'), decimal), Target::Detector),
        map(preceded(char('L'), decimal), Target::Observable),
        map(char('^'), |_| Target::Separator),
        map(decimal, Target::Number),
    ))(input)
}

fn instruction(input: &str) -> IResult<&str, Instruction<'_>> {
    let (input, (name, _, args)) = tuple((name, opt(tag), opt(args)))(input)?;
    let (input, targets) = separated_list0(space1, target)(input.trim_start())?;
    let (input, open) = opt(preceded(space0, char('{')))(input)?;
    Ok((
        input,
        Instruction {
            name,
            args: args.unwrap_or_default(),
            targets,
            opens_block: open.is_some(),
        },
    ))
}

fn line(input: &str) -> IResult<&str, Line<'_>> {
    all_consuming(terminated(
        alt((
            map(char('}'), |_| Line::CloseBlock),
            map(instruction, Line::Instruction),
        )),
        space0,
    ))(input)
}

/// Strips comments and surrounding whitespace, then parses one line.
fn parse_line(raw: &str) -> Result<Option<Line<'_>>> {
    let content = raw.split('#').next().unwrap_or_default().trim();
    if content.is_empty() {
        return Ok(None);
    }
    let (_, parsed) = line(content).map_err(|e| anyhow!("malformed instruction `{content}`: {e}"))?;
    Ok(Some(parsed))
}

/// Groups the flat line list into nested `repeat` blocks.
fn build_program(text: &str) -> Result<Vec<Item<'_>>> {
    let mut stack: Vec<(usize, u64, Vec<Item<'_>>)> = Vec::new();
    let mut top: Vec<Item<'_>> = Vec::new();

    for (index, raw) in text.lines().enumerate() {
        let line_no = index + 1;
        let Some(parsed) = parse_line(raw).with_context(|| format!("line {line_no}"))? else {
            continue;
        };
        match parsed {
            Line::CloseBlock => {
                let (line, count, body) = stack
                    .pop()
                    .ok_or_else(|| anyhow!("line {line_no}: `}}` without an open block"))?;
                let parent = stack.last_mut().map(|(_, _, body)| body).unwrap_or(&mut top);
                parent.push(Item::Repeat { line, count, body });
            }
            Line::Instruction(instr) if instr.name == "repeat" => {
                if !instr.opens_block {
                    bail!("line {line_no}: `repeat` must open a block");
                }
                let count = match instr.targets.as_slice() {
                    [Target::Number(n)] => *n,
                    _ => bail!("line {line_no}: `repeat` takes exactly one repetition count"),
                };
                stack.push((line_no, count, Vec::new()));
            }
            Line::Instruction(instr) => {
                if instr.opens_block {
                    bail!("line {line_no}: `{}` cannot open a block", instr.name);
                }
                let current = stack.last_mut().map(|(_, _, body)| body).unwrap_or(&mut top);
                current.push(Item::Single(line_no, instr));
            }
        }
    }

    if let Some((line, _, _)) = stack.last() {
        bail!("line {line}: `repeat` block is never closed");
    }
    Ok(top)
}

#[derive(Default)]
struct Interpreter {
    detector_offset: u64,
    coord_offset: Vec<f64>,
    mechanisms: Vec<ErrorMechanism>,
    num_detectors: u64,
    num_observables: u64,
    detector_x: BTreeMap<u64, f64>,
    executed: u64,
    ignored: BTreeSet<String>,
}

impl Interpreter {
    fn step(&mut self, line: usize) -> Result<()> {
        self.executed += 1;
        if self.executed > MAX_EXPANDED_STEPS {
            bail!("line {line}: more than {MAX_EXPANDED_STEPS} steps after unrolling `repeat` blocks");
        }
        Ok(())
    }

    fn run(&mut self, items: &[Item<'_>]) -> Result<()> {
        for item in items {
            match item {
                Item::Single(line, instr) => {
                    self.step(*line)?;
                    self.execute(instr).with_context(|| format!("line {line}"))?;
                }
                Item::Repeat { line, count, body } => {
                    // each iteration costs at least one step
                    if *count > MAX_EXPANDED_STEPS - self.executed.min(MAX_EXPANDED_STEPS) {
                        bail!("line {line}: `repeat {count}` exceeds the unrolling limit of {MAX_EXPANDED_STEPS} steps");
                    }
                    debug!(line, count, "unrolling repeat block");
                    for _ in 0..*count {
                        self.step(*line)?;
                        self.run(body)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn shifted_coords(&self, coords: &[f64]) -> Vec<f64> {
        coords
            .iter()
            .enumerate()
            .map(|(i, c)| c + self.coord_offset.get(i).copied().unwrap_or(0.0))
            .collect()
    }

    fn execute(&mut self, instr: &Instruction<'_>) -> Result<()> {
        match instr.name {
            "error" => self.error(instr),
            "detector" => {
                let coords = self.shifted_coords(&instr.args);
                for t in &instr.targets {
                    let Target::Detector(d) = *t else {
                        bail!("`detector` only takes D targets");
                    };
                    let d = d + self.detector_offset;
                    self.num_detectors = self.num_detectors.max(d + 1);
                    if let Some(&x) = coords.first() {
                        self.detector_x.insert(d, x);
                    }
                }
                Ok(())
            }
            "logical_observable" => {
                for t in &instr.targets {
                    let Target::Observable(l) = *t else {
                        bail!("`logical_observable` only takes L targets");
                    };
                    self.num_observables = self.num_observables.max(l + 1);
                }
                Ok(())
            }
            "shift_detectors" => {
                if self.coord_offset.len() < instr.args.len() {
                    self.coord_offset.resize(instr.args.len(), 0.0);
                }
                for (offset, delta) in self.coord_offset.iter_mut().zip(&instr.args) {
                    *offset += delta;
                }
                for t in &instr.targets {
                    let Target::Number(n) = *t else {
                        bail!("`shift_detectors` takes a plain detector count");
                    };
                    self.detector_offset += n;
                }
                Ok(())
            }
            other => {
                if self.ignored.insert(other.to_string()) {
                    warn!(instruction = other, "skipping unsupported DEM instruction");
                }
                Ok(())
            }
        }
    }

    fn error(&mut self, instr: &Instruction<'_>) -> Result<()> {
        let p = match instr.args.as_slice() {
            [p] => *p,
            _ => bail!("`error` takes exactly one probability argument"),
        };
        if !(0.0..=1.0).contains(&p) {
            bail!("error probability {p} is outside [0, 1]");
        }

        // a target listed twice flips its check twice, i.e. not at all
        let mut detectors = BTreeSet::new();
        let mut observables = BTreeSet::new();
        for t in &instr.targets {
            match *t {
                Target::Detector(d) => {
                    let d = d + self.detector_offset;
                    self.num_detectors = self.num_detectors.max(d + 1);
                    if !detectors.insert(d) {
                        detectors.remove(&d);
                    }
                }
                Target::Observable(l) => {
                    self.num_observables = self.num_observables.max(l + 1);
                    if !observables.insert(l) {
                        observables.remove(&l);
                    }
                }
                Target::Separator => {}
                Target::Number(n) => bail!("unexpected bare number {n} in `error` targets"),
            }
        }

        let detectors = detectors
            .into_iter()
            .map(|d| u32::try_from(d).context("detector index does not fit in 32 bits"))
            .collect::<Result<Vec<_>>>()?;
        let observables = observables
            .into_iter()
            .map(|l| u32::try_from(l).context("observable index does not fit in 32 bits"))
            .collect::<Result<Vec<_>>>()?;
        self.mechanisms
            .push(ErrorMechanism::new(detectors, observables).with_probability(p));
        Ok(())
    }

    fn finish(self) -> Result<ErrorModel> {
        let num_detectors = u32::try_from(self.num_detectors).context("too many detectors")?;
        let num_observables = u32::try_from(self.num_observables).context("too many observables")?;

        let mut groups: BTreeMap<Coord, BTreeSet<u32>> = BTreeMap::new();
        for (d, x) in self.detector_x {
            groups.entry(Coord(x)).or_default().insert(d as u32);
        }

        let model = ErrorModel::new(num_detectors, num_observables, self.mechanisms)?
            .with_detector_groups(groups);
        Ok(model)
    }
}

/// Parses the text of a detector error model.
///
/// Supports `error`, `detector`, `logical_observable`, `shift_detectors` and
/// nested `repeat` blocks. Other instructions are skipped with a warning.
///
/// # Arguments
///
/// * `text` - Full contents of a .dem file
///
/// # Returns
///
/// The validated model with its detector x-coordinate groups, or an error
/// naming the offending line. Unrolling stops with an error once
/// `repeat` blocks expand past 50 million steps.
pub fn parse_dem(text: &str) -> Result<ErrorModel> {
    let program = build_program(text)?;
    let mut interpreter = Interpreter::default();
    interpreter.run(&program)?;
    let model = interpreter.finish()?;
    debug!(
        errors = model.num_errors(),
        detectors = model.num_detectors(),
        observables = model.num_observables(),
        columns = model.detector_groups().len(),
        "parsed detector error model"
    );
    Ok(model)
}

/// Loads a Stim .dem file into an `ErrorModel`.
pub fn load_dem_file<P: AsRef<Path>>(path: P) -> Result<ErrorModel> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to open .dem file {}", path.display()))?;
    parse_dem(&text).with_context(|| format!("Failed to parse {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instruction_head() {
        let (_, parsed) = instruction("error[leak](0.125) D0 D3 ^ L1").unwrap();
        assert_eq!(parsed.name, "error");
        assert_eq!(parsed.args, vec![0.125]);
        assert_eq!(
            parsed.targets,
            vec![
                Target::Detector(0),
                Target::Detector(3),
                Target::Separator,
                Target::Observable(1)
            ]
        );
        assert!(!parsed.opens_block);
    }

    #[test]
    fn coordinates_and_block_opener() {
        let (_, det) = instruction("detector(1.5, -2, 0) D7").unwrap();
        assert_eq!(det.args, vec![1.5, -2.0, 0.0]);

        let (_, rep) = instruction("repeat 12 {").unwrap();
        assert_eq!(rep.targets, vec![Target::Number(12)]);
        assert!(rep.opens_block);
    }

    #[test]
    fn comments_and_blank_lines_are_skipped() {
        assert_eq!(parse_line("   # nothing here").unwrap(), None);
        assert_eq!(parse_line("}  # end").unwrap(), Some(Line::CloseBlock));
        assert!(parse_line("error(0.1) D0 Q3").is_err());
    }
}
