//! Flattening statements into spaced tokens.
//!
//! Each logical line is reduced to its leaves. Spacing between two leaves is
//! decided from the leaves themselves and the syntax node that owns them, so
//! `f(x)` hugs its bracket while `if (x)` does not.

use pytidy_core::ParsedModule;
use pytidy_core::syntax::children;
use std::borrow::Cow;
use tree_sitter::Node;

/// Nodes emitted as a single token
const ATOMIC: &[&str] = &["string", "import_prefix"];

/// Owners of an `=` written without surrounding spaces
const TIGHT_EQUALS: &[&str] = &["keyword_argument", "default_parameter", "keyword_pattern"];

const SPLATS: &[&str] = &[
    "list_splat",
    "dictionary_splat",
    "list_splat_pattern",
    "dictionary_splat_pattern",
    "splat_pattern",
];

/// Operands that keep `**` hugged
const SIMPLE_OPERANDS: &[&str] = &["identifier", "integer", "float", "true", "false", "none"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Class {
    Open,
    Close,
    Comma,
    Other,
}

#[derive(Debug, Clone)]
pub(crate) struct Token {
    pub text: String,
    pub class: Class,
    pub space_before: bool,
    /// Id of the node the token belongs to; a bracket pair delimits only the
    /// commas it shares an owner with
    pub owner: usize,
    pub owner_kind: &'static str,
    /// Brackets added by the layout engine, printed only when split
    pub synthetic: bool,
    /// The pair opened here must be split
    pub force_split: bool,
}

struct Leaf {
    text: String,
    kind: &'static str,
    named: bool,
    parent: usize,
    parent_kind: &'static str,
    /// First child of its parent
    leading: bool,
    /// Operator of a `**` between simple operands
    hug: bool,
    synthetic: bool,
}

impl Leaf {
    fn is(&self, text: &str) -> bool {
        !self.named && self.text == text
    }

    fn keyword(&self) -> bool {
        !self.named && self.text.starts_with(|c: char| c.is_alphabetic() || c == '_')
    }

    fn class(&self) -> Class {
        if self.named {
            return Class::Other;
        }
        match self.text.as_str() {
            "(" | "[" | "{" => Class::Open,
            ")" | "]" | "}" => Class::Close,
            "," => Class::Comma,
            _ => Class::Other,
        }
    }
}

/// Comments and backslash continuations force a line to be copied verbatim.
pub(crate) fn needs_verbatim(node: Node<'_>) -> bool {
    matches!(node.kind(), "comment" | "line_continuation")
        || (node.kind() != "string" && children(node).into_iter().any(needs_verbatim))
}

/// Tokens of the logical line made of `nodes`, which share one parent.
pub(crate) fn tokenize(parsed: &ParsedModule<'_>, nodes: &[Node<'_>]) -> Vec<Token> {
    let mut leaves = Vec::new();
    for (i, node) in nodes.iter().enumerate() {
        let parent = node.parent();
        let context = (parent.map_or(0, |p| p.id()), parent.map_or("", |p| p.kind()));
        collect(parsed, *node, context, i == 0, false, &mut leaves);
    }

    let mut force_split = false;
    if let [statement] = nodes
        && matches!(statement.kind(), "import_from_statement" | "future_import_statement")
    {
        force_split = parenthesize_from_import(*statement, &mut leaves);
    }

    let mut tokens: Vec<Token> = Vec::with_capacity(leaves.len());
    for (i, leaf) in leaves.iter().enumerate() {
        let space_before = i > 0 && space_between(&leaves[i - 1], leaf);
        tokens.push(Token {
            text: leaf.text.clone(),
            class: leaf.class(),
            space_before,
            owner: leaf.parent,
            owner_kind: leaf.parent_kind,
            synthetic: leaf.synthetic,
            force_split: leaf.synthetic && force_split,
        });
    }
    tokens
}

fn collect(
    parsed: &ParsedModule<'_>,
    node: Node<'_>,
    parent: (usize, &'static str),
    leading: bool,
    hug: bool,
    out: &mut Vec<Leaf>,
) {
    if node.child_count() == 0 || ATOMIC.contains(&node.kind()) {
        let text = match node.kind() {
            "string" => normalize_string(parsed.text(node)).into_owned(),
            "import_prefix" => parsed.text(node).split_whitespace().collect(),
            _ => parsed.text(node).to_string(),
        };
        out.push(Leaf {
            text,
            kind: node.kind(),
            named: node.is_named(),
            parent: parent.0,
            parent_kind: parent.1,
            leading,
            hug,
            synthetic: false,
        });
        return;
    }

    let operator = node.child_by_field_name("operator");
    let hug_power = node.kind() == "binary_operator"
        && operator.is_some_and(|op| op.kind() == "**")
        && node.child_by_field_name("left").is_some_and(is_simple_operand)
        && node.child_by_field_name("right").is_some_and(is_simple_operand);

    for (i, child) in children(node).into_iter().enumerate() {
        let is_operator = hug_power && Some(child) == operator;
        collect(parsed, child, (node.id(), node.kind()), i == 0, is_operator, out);
    }
}

fn is_simple_operand(node: Node<'_>) -> bool {
    match node.kind() {
        "unary_operator" => node.child_by_field_name("argument").is_some_and(is_simple_operand),
        "attribute" => node.child_by_field_name("object").is_some_and(is_simple_operand),
        kind => SIMPLE_OPERANDS.contains(&kind),
    }
}

/// Drop the written parentheses of a from-import and wrap its names in a
/// synthetic pair. Returns whether the written list had a trailing comma.
fn parenthesize_from_import(statement: Node<'_>, leaves: &mut Vec<Leaf>) -> bool {
    let owner = statement.id();
    let own = |leaf: &Leaf, text: &str| leaf.parent == owner && leaf.is(text);

    let Some(close) = leaves.iter().rposition(|leaf| own(leaf, ")")) else {
        return add_synthetic_pair(statement, leaves, false);
    };
    let magic = close > 0 && own(&leaves[close - 1], ",");
    leaves.remove(close);
    if magic {
        leaves.remove(close - 1);
    }
    if let Some(open) = leaves.iter().position(|leaf| own(leaf, "(")) {
        leaves.remove(open);
    }
    add_synthetic_pair(statement, leaves, magic)
}

fn add_synthetic_pair(statement: Node<'_>, leaves: &mut Vec<Leaf>, magic: bool) -> bool {
    let owner = statement.id();
    if leaves.iter().any(|leaf| leaf.kind == "wildcard_import") {
        return false;
    }
    let is_keyword = |leaf: &Leaf| leaf.parent == owner && leaf.is("import");
    let Some(import) = leaves.iter().position(is_keyword) else {
        return false;
    };
    let synthetic = |text: &str| Leaf {
        text: text.to_string(),
        kind: statement.kind(),
        named: false,
        parent: owner,
        parent_kind: statement.kind(),
        leading: false,
        hug: false,
        synthetic: true,
    };
    leaves.insert(import + 1, synthetic("("));
    leaves.push(synthetic(")"));
    magic
}

fn space_between(prev: &Leaf, cur: &Leaf) -> bool {
    let (prev_class, cur_class) = (prev.class(), cur.class());
    if prev_class == Class::Open || cur_class == Class::Close {
        return false;
    }
    if cur.is(",") || cur.is(";") {
        return false;
    }
    if cur.is(":") {
        return prev_class == Class::Comma;
    }
    if prev.is(":") && prev.parent_kind == "slice" {
        return false;
    }
    if prev.hug || cur.hug {
        return false;
    }
    if (cur.is("=") && TIGHT_EQUALS.contains(&cur.parent_kind))
        || (prev.is("=") && TIGHT_EQUALS.contains(&prev.parent_kind))
    {
        return false;
    }
    if prev.leading && prev.parent_kind == "unary_operator" {
        return false;
    }
    if (prev.is("*") || prev.is("**")) && SPLATS.contains(&prev.parent_kind) {
        return false;
    }
    if prev.is("@") && prev.parent_kind == "decorator" {
        return false;
    }
    // `except*` keeps its star on the keyword
    if cur.is("*") && prev.is("except") && cur.parent_kind == "except_group_clause" {
        return false;
    }
    if prev.kind == "import_prefix" {
        return cur.keyword();
    }
    if cur.is(".") {
        return prev.keyword() || prev.kind == "integer";
    }
    if prev.is(".") {
        return cur.keyword();
    }
    if cur_class == Class::Open && !cur.is("{") {
        return !(prev_class == Class::Close || matches!(prev.kind, "identifier" | "string"));
    }
    true
}

/// Render `tokens` on one line. Synthetic brackets are printed only when
/// `show_synthetic` is set; a hidden one lends its spacing to the next token.
pub(crate) fn join(tokens: &[Token], show_synthetic: bool) -> String {
    let mut out = String::new();
    let mut carried = false;
    for token in tokens {
        if token.synthetic && !show_synthetic {
            carried = token.space_before;
            continue;
        }
        if !out.is_empty() && (token.space_before || carried) {
            out.push(' ');
        }
        carried = false;
        out.push_str(&token.text);
    }
    out
}

/// Prefer double quotes for plain single-quoted strings.
pub(crate) fn normalize_string(text: &str) -> Cow<'_, str> {
    let Some(quote_at) = text.find(['\'', '"']) else {
        return Cow::Borrowed(text);
    };
    let (prefix, rest) = text.split_at(quote_at);
    if prefix.contains(['f', 'F', 't', 'T']) || !rest.starts_with('\'') {
        return Cow::Borrowed(text);
    }
    let (quote, double) = if rest.starts_with("'''") { ("'''", "\"\"\"") } else { ("'", "\"") };
    if rest.len() < 2 * quote.len() || !rest.ends_with(quote) {
        return Cow::Borrowed(text);
    }
    let body = &rest[quote.len()..rest.len() - quote.len()];
    if body.contains(['"', '\\']) {
        return Cow::Borrowed(text);
    }
    Cow::Owned(format!("{prefix}{double}{body}{double}"))
}

/// `#comment` becomes `# comment`; shebangs, `#:` and `#!` markers are kept.
pub(crate) fn normalize_comment(text: &str) -> String {
    let text = text.trim_end();
    let content = text.strip_prefix('#').unwrap_or(text);
    if content.is_empty() || content.starts_with([' ', '!', ':', '#', '\'']) {
        text.to_string()
    } else {
        format!("# {content}")
    }
}
