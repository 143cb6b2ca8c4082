//! A width-aware layout engine for Python source.
//!
//! Every logical line is re-tokenized from the syntax tree and laid out by
//! [`line`]: joined when it fits, otherwise split at its brackets with one
//! element per line and a trailing comma. Blank lines between statements
//! follow a fixed policy. Lines holding comments or backslash continuations
//! are kept as written.

mod config;
mod error;
mod line;
mod tokens;
mod writer;

pub use config::FormatOptions;
pub use error::LayoutError;

use log::debug;
use pytidy_core::parse_module;
use pytidy_core::syntax::line_ending;
use writer::Writer;

/// Lay out `source` within `options.line_width` columns.
///
/// The line terminator of the input is kept. The result is re-parsed before
/// it is returned.
pub fn format_source(source: &str, options: &FormatOptions) -> Result<String, LayoutError> {
    let parsed = parse_module(source)?;
    let mut writer = Writer::new(&parsed, usize::from(options.line_width));
    writer.suite(parsed.root(), 0)?;
    let lines = writer.finish();
    debug!("Laid out {} line(s)", lines.len());

    let output = if lines.is_empty() {
        String::new()
    } else {
        let eol = line_ending(source);
        let mut output = lines.join(eol);
        output.push_str(eol);
        output
    };
    parse_module(&output).map_err(LayoutError::Print)?;
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENARIO: &str = r#"
import sys
def foo():
    "test function"
    print("something",
          file=sys.stderr)
foo()
"#;

    const SCENARIO_FORMATTED: &str = r#"import sys


def foo():
    "test function"
    print("something", file=sys.stderr)


foo()
"#;

    const SCENARIO_NARROW: &str = r#"import sys


def foo():
    "test function"
    print(
        "something",
        file=sys.stderr,
    )


foo()
"#;

    const SAMPLE: &str = r#""""Module docs."""
import os
import sys
x = {'a':1,'b':[1,2,3]}
class Foo(Base):
    '''Doc.'''
    attr = 1
    def method(self, a, b=2, *args, **kwargs):
        if a:
            return a
        elif b:
            pass
        else:
            raise ValueError('bad')
    @property
    def value(self):  # the value
        return self._value
# leading comment
def main():
    try:
        run()
    except (OSError, ValueError) as err:
        print(err)
    finally:
        cleanup()
    for i in range(10):
        print(i**2)
    with open('f') as fh:
        data = fh.read()
    items = [
        1,  # one
        2,
    ]
    return data
if __name__ == '__main__':
    main()
"#;

    const SAMPLE_FORMATTED: &str = r#""""Module docs."""

import os
import sys

x = {"a": 1, "b": [1, 2, 3]}


class Foo(Base):
    """Doc."""
    attr = 1

    def method(self, a, b=2, *args, **kwargs):
        if a:
            return a
        elif b:
            pass
        else:
            raise ValueError("bad")

    @property
    def value(self):  # the value
        return self._value


# leading comment
def main():
    try:
        run()
    except (OSError, ValueError) as err:
        print(err)
    finally:
        cleanup()
    for i in range(10):
        print(i**2)
    with open("f") as fh:
        data = fh.read()
    items = [
        1,  # one
        2,
    ]
    return data


if __name__ == "__main__":
    main()
"#;

    fn format(source: &str) -> String {
        format_source(source, &FormatOptions::default()).unwrap()
    }

    #[test]
    fn test_scenario_default_width() {
        assert_eq!(format(SCENARIO), SCENARIO_FORMATTED);
    }

    #[test]
    fn test_scenario_narrow_width() {
        let out = format_source(SCENARIO, &FormatOptions { line_width: 20 }).unwrap();
        assert_eq!(out, SCENARIO_NARROW);
    }

    #[test]
    fn test_sample_module() {
        assert_eq!(format(SAMPLE), SAMPLE_FORMATTED);
    }

    #[test]
    fn test_layout_is_idempotent() {
        for width in [20, 40, 88] {
            let options = FormatOptions { line_width: width };
            for source in [SCENARIO, SAMPLE] {
                let once = format_source(source, &options).unwrap();
                assert_eq!(format_source(&once, &options).unwrap(), once, "width {width}");
            }
        }
    }

    #[test]
    fn test_blank_lines_are_normalized() {
        assert_eq!(format("\n\n\nx = 1\n\n\n\n\ny = 2\n"), "x = 1\n\n\ny = 2\n");
        assert_eq!(
            format("def f():\n\n    a = 1\n\n\n\n    b = 2\n"),
            "def f():\n    a = 1\n\n    b = 2\n"
        );
    }

    #[test]
    fn test_blank_line_before_imports_after_code() {
        assert_eq!(format("x = 1\nimport os\n"), "x = 1\n\nimport os\n");
        assert_eq!(format("x = 1\n\n\nimport os\n"), "x = 1\n\nimport os\n");
        assert_eq!(format("x = 1\n# about os\nimport os\n"), "x = 1\n\n# about os\nimport os\n");
        assert_eq!(
            format("def f():\n    x = 1\n    import os\n"),
            "def f():\n    x = 1\n\n    import os\n"
        );
    }

    #[test]
    fn test_simple_statements_get_their_own_lines() {
        assert_eq!(format("a = 1; b = 2\n"), "a = 1\nb = 2\n");
        assert_eq!(format("if x: y = 1\n"), "if x:\n    y = 1\n");
    }

    #[test]
    fn test_comments_are_normalized() {
        assert_eq!(format("x = 1 #note\n#own line\ny = 2\n"), "x = 1  # note\n# own line\ny = 2\n");
        assert_eq!(format("#!/usr/bin/env python\nx = 1\n"), "#!/usr/bin/env python\nx = 1\n");
    }

    #[test]
    fn test_crlf_is_preserved() {
        assert_eq!(format("x=1\r\ny=2\r\n"), "x = 1\r\ny = 2\r\n");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(format(""), "");
        assert_eq!(format("\n\n"), "");
    }

    #[test]
    fn test_python2_source_is_a_parse_error() {
        let err = format_source("print \"hello world!\"\n", &FormatOptions::default()).unwrap_err();
        assert!(matches!(err, LayoutError::Parse(_)), "got {err:?}");
    }
}
