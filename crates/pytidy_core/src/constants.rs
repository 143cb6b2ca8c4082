//! Constants shared by the formatter, the import sorter and the checker.

/// File extensions treated as Python sources
pub const PYTHON_EXTENSIONS: &[&str] = &[
    "py",  // Python module
    "pyi", // Typing stub
];

/// Line width used when no option overrides it
pub const DEFAULT_LINE_WIDTH: u16 = 88;

/// Largest accepted line width
pub const MAX_LINE_WIDTH: u16 = 320;

/// Spaces per indentation level in rendered output
pub const INDENT_WIDTH: usize = 4;
