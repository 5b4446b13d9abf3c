/// Deferred log entries.
///
/// The frontend compiler cannot know wire values, so a circuit log is stored
/// as a format string plus the wire ids to substitute. Entries are resolved
/// against the final wire vector once solving ends; the same record type
/// backs the per-constraint debug info used in failure diagnostics.

use ark_bn254::Fr;
use serde::{Deserialize, Serialize};

/// A deferred log line: `format` with positional `{}` placeholders, each
/// substituted with the decimal value of the matching wire in `to_resolve`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub format: String,
    pub to_resolve: Vec<usize>,
}

impl LogEntry {
    /// Resolve the entry against a wire vector.
    ///
    /// A wire that was never instantiated (or is out of range) renders as
    /// the literal `"???"`. Placeholders beyond the last wire id are left
    /// untouched.
    pub fn resolve(&self, wire_values: &[Fr], instantiated: &[bool]) -> String {
        let mut out = String::with_capacity(self.format.len());
        let mut wires = self.to_resolve.iter();
        let mut rest = self.format.as_str();
        while let Some(pos) = rest.find("{}") {
            out.push_str(&rest[..pos]);
            match wires.next() {
                Some(&wire) => {
                    if instantiated.get(wire).copied().unwrap_or(false) {
                        out.push_str(&wire_values[wire].to_string());
                    } else {
                        out.push_str("???");
                    }
                }
                None => out.push_str("{}"),
            }
            rest = &rest[pos + 2..];
        }
        out.push_str(rest);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_ff::One;

    #[test]
    fn test_resolve_substitutes_decimal_values() {
        let entry = LogEntry {
            format: "x = {}, y = {}\n".to_string(),
            to_resolve: vec![1, 2],
        };
        let wires = vec![Fr::one(), Fr::from(7u64), Fr::from(13u64)];
        let set = vec![true, true, true];
        assert_eq!(entry.resolve(&wires, &set), "x = 7, y = 13\n");
    }

    #[test]
    fn test_resolve_uninstantiated_wire() {
        let entry = LogEntry {
            format: "x = {}".to_string(),
            to_resolve: vec![1],
        };
        let wires = vec![Fr::one(), Fr::from(7u64)];
        let set = vec![true, false];
        assert_eq!(entry.resolve(&wires, &set), "x = ???");
    }

    #[test]
    fn test_resolve_out_of_range_wire() {
        let entry = LogEntry {
            format: "w = {}".to_string(),
            to_resolve: vec![9],
        };
        let wires = vec![Fr::one()];
        let set = vec![true];
        assert_eq!(entry.resolve(&wires, &set), "w = ???");
    }

    #[test]
    fn test_resolve_spare_placeholder_is_kept() {
        let entry = LogEntry {
            format: "{} and {}".to_string(),
            to_resolve: vec![0],
        };
        let wires = vec![Fr::one()];
        let set = vec![true];
        assert_eq!(entry.resolve(&wires, &set), "1 and {}");
    }
}
