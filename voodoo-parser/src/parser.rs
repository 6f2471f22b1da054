use crate::error::ParseVariablesError;
use crate::flags::{apply_flags, ParseFlags};
use crate::token::do_lex;
use log::{debug, warn};
use rustc_hash::FxHashMap;
use std::fs::File;
use std::io::Read;
use std::ops::Range;
use std::path::Path;

/// The maximum depth of nested resolution before parsing stops.
pub const MAX_DEPTH: usize = 8;

const VAR_PRE_MARKER: &str = "$(";
const VAR_DELIM_END: char = ')';
const VAR_STATE_SEPARATOR: char = ':';
const VAR_MARKER_RESOLVE: char = '$';
const VAR_MARKER_SUPPRESS: char = '?';
const VAR_MARKER_NO_PARSE: char = '!';
const BAD_VARIABLE_PREFIX: &str = "badvar:";

const LOG_TARGET: &str = "voodoo::parser";

/// The kind of variable that can be added to a parser.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum VariableType {
    /// Seeded once, never overwritten.
    System,
    /// Freely overwritten and removed.
    User,
}

/// The scope a variable was resolved from.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum VariableScope {
    System,
    /// Assigned earlier in the same top-level parse.
    State,
    User,
    Environment,
}

/// The result of a parse, with diagnostics.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ParseOutput {
    pub value: String,
    /// Nested resolution hit [`MAX_DEPTH`] and some input was left unresolved.
    pub depth_exceeded: bool,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum VariableMode {
    Normal,
    Resolve,
    Suppress,
    NoParse,
}

impl VariableMode {
    fn split(name: &str) -> (VariableMode, &str) {
        let mode = match name.chars().next() {
            Some(VAR_MARKER_RESOLVE) => VariableMode::Resolve,
            Some(VAR_MARKER_SUPPRESS) => VariableMode::Suppress,
            Some(VAR_MARKER_NO_PARSE) => VariableMode::NoParse,
            _ => return (VariableMode::Normal, name),
        };
        (mode, &name[1..])
    }
}

/// Byte ranges of substituted values, which are never scanned for variables again.
#[derive(Default)]
struct Substituted(Vec<Range<usize>>);

impl Substituted {
    fn contains(&self, index: usize) -> bool {
        self.0.iter().any(|range| range.contains(&index))
    }

    /// Record that `replaced` now holds `len` bytes of substituted text.
    fn splice(&mut self, replaced: Range<usize>, len: usize) {
        self.0
            .retain(|range| range.end <= replaced.start || range.start >= replaced.end);
        for range in &mut self.0 {
            if range.start >= replaced.end {
                range.start = range.start - replaced.len() + len;
                range.end = range.end - replaced.len() + len;
            }
        }
        if len > 0 {
            self.0.push(replaced.start..replaced.start + len);
        }
    }
}

/// State variables and diagnostics for a single top-level parse.
#[derive(Default)]
struct ParseContext {
    state: FxHashMap<String, String>,
    depth_exceeded: bool,
}

/// Resolves `$(name)` variables in strings.
///
/// Variables are looked up by lowercased name, first in the system variables, then in
/// state variables assigned during the current parse with `$(name:value)`, then in the
/// user variables and finally in the process environment. A variable that cannot be
/// found is replaced with `badvar:name`, or with nothing if written as `$(?name)`.
/// The resolved value is itself parsed unless written as `$(!name)`.
#[derive(Debug, Default, Clone)]
pub struct VariableParser {
    system: FxHashMap<String, String>,
    user: FxHashMap<String, String>,
}

impl VariableParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a variable.
    ///
    /// Adding a system variable that already exists does nothing. Returns whether the
    /// value was stored.
    pub fn add(&mut self, name: &str, value: &str, ty: VariableType) -> bool {
        let name = self.variable_key(name, &mut ParseContext::default(), 0);
        match ty {
            VariableType::System => {
                if self.system.contains_key(&name) {
                    debug!(target: LOG_TARGET, "system variable {name} is already set");
                    return false;
                }
                self.system.insert(name, value.to_string());
            }
            VariableType::User => {
                self.user.insert(name, value.to_string());
            }
        }
        true
    }

    /// Remove a user variable. System variables can not be removed.
    pub fn remove(&mut self, name: &str) -> bool {
        let name = self.variable_key(name, &mut ParseContext::default(), 0);
        self.user.remove(&name).is_some()
    }

    /// Find the unparsed value of a variable and the scope it was found in.
    pub fn lookup(&self, name: &str) -> Option<(String, VariableScope)> {
        let mut context = ParseContext::default();
        let key = self.variable_key(name, &mut context, 0);
        self.find_variable(&key, &context)
    }

    /// Resolve all variables in `input` and apply `flags` to the result.
    pub fn parse(&self, input: impl AsRef<str>, flags: ParseFlags) -> String {
        self.parse_with_report(input, flags).value
    }

    /// Resolve all variables in `input`, reporting whether resolution was cut short.
    pub fn parse_with_report(&self, input: impl AsRef<str>, flags: ParseFlags) -> ParseOutput {
        let input = input.as_ref();
        let mut context = ParseContext::default();
        let value = self.parse_recursive(input, flags, &mut context, 0);

        if context.depth_exceeded {
            warn!(
                target: LOG_TARGET,
                "exceeded maximum depth ({MAX_DEPTH}) while parsing {input}"
            );
        }

        ParseOutput {
            value,
            depth_exceeded: context.depth_exceeded,
        }
    }

    /// Add every definition in a variable file, returning how many were added.
    pub fn load_variables(
        &mut self,
        path: impl AsRef<Path>,
        ty: VariableType,
    ) -> Result<usize, ParseVariablesError> {
        let path = path.as_ref();
        let mut contents = String::new();
        File::open(path)
            .and_then(|mut f| f.read_to_string(&mut contents))
            .map_err(|e| ParseVariablesError::IOError(path.to_path_buf(), e))?;

        self.add_variables_from_str(&contents, ty)
    }

    /// Add every `name = value` definition in `source`, returning how many were added.
    pub fn add_variables_from_str(
        &mut self,
        source: &str,
        ty: VariableType,
    ) -> Result<usize, ParseVariablesError> {
        let tokens = do_lex(source)?;
        let mut added = 0;
        for token in tokens {
            if self.add(token.key.fragment(), token.value.fragment(), ty) {
                added += 1;
            }
        }
        Ok(added)
    }

    fn find_variable(&self, key: &str, context: &ParseContext) -> Option<(String, VariableScope)> {
        if let Some(value) = self.system.get(key) {
            return Some((value.clone(), VariableScope::System));
        }
        if let Some(value) = context.state.get(key) {
            return Some((value.clone(), VariableScope::State));
        }
        if let Some(value) = self.user.get(key) {
            return Some((value.clone(), VariableScope::User));
        }

        std::env::var(key)
            .or_else(|_| std::env::var(key.to_uppercase()))
            .ok()
            .map(|value| (value, VariableScope::Environment))
    }

    /// Resolve a variable name and normalize it to a lookup key.
    fn variable_key(&self, name: &str, context: &mut ParseContext, depth: usize) -> String {
        let name = self.parse_recursive(name, ParseFlags::NONE, context, depth);
        apply_flags(name, ParseFlags::VAR_NAME)
    }

    fn parse_recursive(
        &self,
        input: &str,
        flags: ParseFlags,
        context: &mut ParseContext,
        depth: usize,
    ) -> String {
        let mut output = input.to_string();
        if output.len() < 3 {
            return output;
        }
        if depth > MAX_DEPTH {
            context.depth_exceeded = true;
            return output;
        }

        let mut substituted = Substituted::default();
        let mut cursor = 0;
        loop {
            let Some(end) = output[cursor..]
                .match_indices(VAR_DELIM_END)
                .map(|(offset, _)| cursor + offset)
                .find(|&index| !substituted.contains(index))
            else {
                break;
            };
            let Some(begin) = output[..end]
                .match_indices(VAR_PRE_MARKER)
                .map(|(index, _)| index)
                .filter(|&index| !substituted.contains(index) && !substituted.contains(index + 1))
                .last()
            else {
                break;
            };

            let name = output[begin + VAR_PRE_MARKER.len()..end].to_string();

            if let Some((state_name, state_value)) = name.split_once(VAR_STATE_SEPARATOR) {
                let value = self.parse_recursive(state_value, ParseFlags::NONE, context, depth + 1);
                let key = self.variable_key(state_name, context, depth + 1);
                context.state.insert(key, value);

                output.replace_range(begin..=end, "");
                substituted.splice(begin..end + 1, 0);
                cursor = begin;
                continue;
            }

            let (mode, name) = VariableMode::split(&name);
            if name.is_empty() {
                output.replace_range(begin..=end, "");
                substituted.splice(begin..end + 1, 0);
                cursor = begin;
                continue;
            }

            let key = self.variable_key(name, context, depth + 1);
            let value = match self.find_variable(&key, context) {
                Some((value, _)) => value,
                None if mode == VariableMode::Suppress => String::new(),
                None => format!("{BAD_VARIABLE_PREFIX}{key}"),
            };

            let value = if mode == VariableMode::NoParse {
                value
            } else {
                self.parse_recursive(&value, ParseFlags::NONE, context, depth + 1)
            };

            output.replace_range(begin..=end, &value);
            substituted.splice(begin..end + 1, value.len());
            cursor = begin + value.len();
        }

        apply_flags(output, flags)
    }
}
