//! Render the primitive/boxed compatibility table as Markdown.
//!
//! The output documents which spellings method resolution treats as interchangeable.
//!
//! ## Examples
//! Run from the workspace root:
//! ```bash
//! cargo run -p nutest_core --bin generate_type_reference > docs/type-reference.md
//! ```

use nutest_core::report;
use nutest_core::types::{self, PRIMITIVES};

fn join_code(spellings: &[&str]) -> String {
    if spellings.is_empty() {
        return "-".to_string();
    }
    spellings
        .iter()
        .map(|s| format!("`{s}`"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn render() -> String {
    let mut out = String::new();
    out.push_str("# nutest type reference\n\n");
    out.push_str("Generated from `nutest_core::types`. Do not edit by hand.\n\n");

    out.push_str("## Primitive and boxed forms\n\n");
    out.push_str("| Primitive | Boxed | Aliases | Boxed aliases | Description |\n");
    out.push_str("|---|---|---|---|---|\n");
    for info in PRIMITIVES {
        out.push_str(&format!(
            "| `{}` | `{}` | {} | {} | {} |\n",
            types::as_str(info.id),
            types::boxed_str(info.id),
            join_code(info.aliases),
            join_code(info.boxed_aliases),
            info.description
        ));
    }

    out.push_str("\nA `null` argument matches boxed and named parameters only. Primitives never widen.\n\n");

    out.push_str("## Report wording\n\n");
    out.push_str(&format!("- Summary header: `{}`\n", report::SUMMARY_HEADER.lines().next().unwrap_or("")));
    out.push_str(&format!("- Full header: `{}`\n", report::FULL_HEADER.lines().next().unwrap_or("")));
    out.push_str(&format!("- Summary footer: `{}`\n", report::SUMMARY_FOOTER.trim()));
    out.push_str(&format!("- Full footer: `{}`\n", report::FULL_FOOTER.trim()));
    out
}

fn main() {
    print!("{}", render());
}
