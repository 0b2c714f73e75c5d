//! Error rendering using ariadne
//!
//! Member path errors are drawn against the path text with the offending
//! segment underlined. Everything else is printed as a one-line message.

use crate::{ConfigError, Error};
use ariadne::{ColorGenerator, IndexType, Label, Report, ReportKind, Source};
use std::io::Write;
use std::ops::Range;

const SOURCE_ID: &str = "<path>";

/// Render an error with formatting to stderr
///
/// # Example
/// ```no_run
/// use remap::{Error, MapperBuilder, TypeManager, render_error};
///
/// let types = TypeManager::new();
/// let person = types.class("Person").unwrap()
///     .property("Name", &types.string())
///     .build().unwrap();
///
/// let mut builder = MapperBuilder::new(&types, &person, &person);
/// if let Err(e) = builder.bind_path("Nmae", "Name") {
///     render_error(&Error::from(e));
/// }
/// ```
pub fn render_error(error: &Error) {
    render_error_to_writer(error, &mut std::io::stderr(), true).ok();
}

/// Render an error to a specific writer
pub fn render_error_to(error: &Error, writer: &mut dyn Write) -> std::io::Result<()> {
    render_error_to_writer(error, writer, true)
}

/// Render an error to a String (useful for logs, UIs, etc.)
pub fn render_error_to_string(error: &Error) -> String {
    let mut buf = Vec::new();
    render_error_to_writer(error, &mut buf, true).ok();
    String::from_utf8_lossy(&buf).to_string()
}

/// Render an error to a String without color codes (useful for tests)
pub fn render_error_to_string_no_color(error: &Error) -> String {
    let mut buf = Vec::new();
    render_error_to_writer(error, &mut buf, false).ok();
    String::from_utf8_lossy(&buf).to_string()
}

fn render_error_to_writer(
    error: &Error,
    writer: &mut dyn Write,
    use_color: bool,
) -> std::io::Result<()> {
    match error {
        Error::Config(ConfigError::UnknownMember {
            ty,
            name,
            path,
            offset,
        }) => {
            let label = format!("`{}` has no member named `{}`", ty, name);
            let help = format!("check the spelling of `{}` and the members of `{}`", name, ty);
            render_path(
                path,
                *offset..offset + name.len(),
                &error.to_string(),
                &label,
                Some(&help),
                writer,
                use_color,
            )
        }
        Error::Config(ConfigError::EmptySegment { path, offset }) => render_path(
            path,
            *offset..offset + 1,
            &error.to_string(),
            "expected a member name here",
            None,
            writer,
            use_color,
        ),
        Error::Type(_) => writeln!(writer, "Type error: {}", error),
        Error::Config(_) => writeln!(writer, "Configuration error: {}", error),
        Error::Compile(_) => writeln!(writer, "Compile error: {}", error),
        Error::Runtime(_) => writeln!(writer, "Runtime error: {}", error),
    }
}

fn render_path(
    path: &str,
    span: Range<usize>,
    message: &str,
    label: &str,
    help: Option<&str>,
    writer: &mut dyn Write,
    use_color: bool,
) -> std::io::Result<()> {
    let mut colors = ColorGenerator::new();
    colors.next(); // Skip the first color.

    // Spans are byte offsets into the path. A trailing empty segment points
    // one past the end.
    let end = span.end.min(path.len()).max(span.start);
    let span = span.start..end;

    let mut report = Report::build(ReportKind::Error, (SOURCE_ID, span.clone()))
        .with_message(message)
        .with_config(
            ariadne::Config::default()
                .with_color(use_color)
                .with_index_type(IndexType::Byte),
        )
        .with_label(
            Label::new((SOURCE_ID, span))
                .with_message(label)
                .with_color(colors.next()),
        );
    if let Some(help) = help {
        report = report.with_help(help);
    }

    report.finish().write((SOURCE_ID, Source::from(path)), &mut *writer)
}
