//! Rendering of values into narrative text. Never affects a check's verdict.

use crate::value::Value;

pub trait Printer {
    fn render(&self, value: &Value) -> String;
}

/// Renders through `Value`'s `Display`.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultPrinter;

impl Printer for DefaultPrinter {
    fn render(&self, value: &Value) -> String {
        value.to_string()
    }
}

/// Comma-separated rendering of an argument list.
pub fn render_args(printer: &dyn Printer, args: &[Value]) -> String {
    args.iter()
        .map(|arg| printer.render(arg))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_args() {
        let args = crate::args![1, "a", 'c'];
        assert_eq!(render_args(&DefaultPrinter, &args), r#"1, "a", 'c'"#);
        assert_eq!(render_args(&DefaultPrinter, &[]), "");
    }
}
