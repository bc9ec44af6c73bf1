//! The immutable result of one check and its narrative text.

/// What a check compared against: a value, or the bounds of a range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expected {
    Value(String),
    Range { low: String, high: String },
}

/// One evaluated check. Values are already rendered by the run's printer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestOutcome {
    pub success: bool,
    /// Lines describing the check (user label, context, reason); may be empty.
    pub label: String,
    pub actual: String,
    pub expected: Expected,
    /// Filtered stack trace; empty for successes and when traces are disabled.
    pub trace: String,
}

impl TestOutcome {
    /// Narrative entry for this outcome as check number `number`.
    ///
    /// ```text
    /// Error in test number 3
    /// deposit adds to the balance
    /// Error trace:
    /// 	checked at tests/bank.rs:14:9
    /// actual:     120
    /// expected:   125
    /// ```
    pub fn narrative(&self, number: usize) -> String {
        let kind = match self.expected {
            Expected::Value(_) => "test number",
            Expected::Range { .. } => "range test number",
        };
        let mut out = if self.success {
            format!("Success in the {kind} {number}\n")
        } else {
            format!("Error in {kind} {number}\n")
        };
        if !self.label.is_empty() {
            out.push_str(&self.label);
            out.push('\n');
        }
        if !self.success {
            out.push_str(&self.trace);
        }
        match &self.expected {
            Expected::Value(expected) => {
                out.push_str(&format!("actual:     {}\nexpected:   {}\n", self.actual, expected));
            }
            Expected::Range { low, high } => {
                out.push_str(&format!("actual:     {}\nlow:   {}\nhigh:   {}\n", self.actual, low, high));
            }
        }
        out
    }
}

/// Join the non-empty label parts, one per line.
pub(crate) fn join_label<I, S>(parts: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    parts
        .into_iter()
        .filter(|p| !p.as_ref().is_empty())
        .map(|p| p.as_ref().to_string())
        .collect::<Vec<_>>()
        .join("\n")
}
