use super::{DeclarationParser, DocComment, FuncDecl, SourceFile, TypeDecl};
use crate::error::ParseError;
use tree_sitter::{Node, Parser};

/// Declaration parser for Go source files, backed by the tree-sitter Go
/// grammar.
///
/// The first syntax error tree-sitter recovers from is reported as a
/// [`ParseError`]. So are a missing `package` clause and statements at file
/// scope, which the grammar tolerates but the Go compiler does not.
#[derive(Debug, Clone, Copy, Default)]
pub struct GoParser;

impl DeclarationParser for GoParser {
    fn parse_source(&self, source: &str) -> Result<SourceFile, ParseError> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_go::LANGUAGE.into())
            .map_err(|e| ParseError::new(1, format!("Go grammar unavailable: {}", e)))?;
        let tree = parser
            .parse(source, None)
            .ok_or_else(|| ParseError::new(1, "parser produced no syntax tree"))?;

        let root = tree.root_node();
        if root.has_error() {
            return Err(syntax_error(root, source));
        }
        collect_declarations(root, source)
    }
}

fn collect_declarations(root: Node, src: &str) -> Result<SourceFile, ParseError> {
    let mut file = SourceFile::default();
    let mut package = None;
    let children = named_children(root);

    for (i, node) in children.iter().enumerate() {
        match node.kind() {
            "package_clause" => {
                package = named_children(*node)
                    .into_iter()
                    .find(|n| n.kind() == "package_identifier")
                    .map(|n| text(n, src).to_string());
            }
            "type_declaration" => {
                let doc = doc_comment(&children[..i], *node, src);
                collect_type_specs(*node, doc, src, &mut file.types);
            }
            "function_declaration" | "method_declaration" => {
                let doc = doc_comment(&children[..i], *node, src);
                file.funcs.push(func_decl(*node, doc, src)?);
            }
            "import_declaration" | "var_declaration" | "const_declaration" | "comment" => {}
            other => {
                return Err(ParseError::new(
                    line_of(*node),
                    format!("expected declaration, found {}", other.replace('_', " ")),
                ));
            }
        }
    }

    file.package = package.ok_or_else(|| ParseError::new(1, "expected 'package' clause"))?;
    Ok(file)
}

/// Handles both `type T ...` and the parenthesized `type ( ... )` form.
fn collect_type_specs(
    decl: Node,
    decl_doc: Option<DocComment>,
    src: &str,
    types: &mut Vec<TypeDecl>,
) {
    let children = named_children(decl);
    for (i, spec) in children.iter().enumerate() {
        if !matches!(spec.kind(), "type_spec" | "type_alias") {
            continue;
        }
        let Some(name) = spec.child_by_field_name("name") else {
            continue;
        };
        // Inside a group the spec's own comment wins over the group's.
        let doc = doc_comment(&children[..i], *spec, src).or_else(|| decl_doc.clone());
        types.push(TypeDecl {
            name: text(name, src).to_string(),
            doc,
        });
    }
}

fn func_decl(node: Node, doc: Option<DocComment>, src: &str) -> Result<FuncDecl, ParseError> {
    let name = node
        .child_by_field_name("name")
        .map(|n| text(n, src).to_string())
        .ok_or_else(|| ParseError::new(line_of(node), "function has no name"))?;
    let receiver = node
        .child_by_field_name("receiver")
        .map(|list| receiver_type(list, src))
        .transpose()?;

    Ok(FuncDecl {
        name,
        receiver,
        doc,
    })
}

/// Base type name of a receiver list such as `(c *Box[T])`.
fn receiver_type(list: Node, src: &str) -> Result<String, ParseError> {
    let params: Vec<Node> = named_children(list)
        .into_iter()
        .filter(|n| n.kind() != "comment")
        .collect();
    let param = match params.as_slice() {
        [] => return Err(ParseError::new(line_of(list), "method has no receiver")),
        [param] => *param,
        _ => return Err(ParseError::new(line_of(list), "method has multiple receivers")),
    };

    let mut cursor = param.walk();
    if param.children_by_field_name("name", &mut cursor).count() > 1 {
        return Err(ParseError::new(line_of(list), "method has multiple receivers"));
    }

    param
        .child_by_field_name("type")
        .and_then(|ty| base_type_name(ty, src))
        .ok_or_else(|| {
            ParseError::new(
                line_of(list),
                format!("invalid receiver type in {}", text(list, src)),
            )
        })
}

/// Strips pointers, parentheses and type arguments. A qualified `pkg.T` is
/// kept whole; it never names a local type.
fn base_type_name(node: Node, src: &str) -> Option<String> {
    match node.kind() {
        "type_identifier" | "qualified_type" => Some(text(node, src).to_string()),
        "pointer_type" | "parenthesized_type" => node
            .named_child(0)
            .and_then(|inner| base_type_name(inner, src)),
        "generic_type" => node
            .child_by_field_name("type")
            .and_then(|inner| base_type_name(inner, src)),
        _ => None,
    }
}

/// The run of comments ending on the line right above `decl`, each on a line
/// of its own with no blank line in between.
fn doc_comment(preceding: &[Node], decl: Node, src: &str) -> Option<DocComment> {
    let mut next_row = decl.start_position().row;
    let mut start = preceding.len();

    while let Some(&comment) = start.checked_sub(1).and_then(|i| preceding.get(i)) {
        if comment.kind() != "comment"
            || comment.end_position().row + 1 != next_row
            || !starts_line(comment, src)
        {
            break;
        }
        next_row = comment.start_position().row;
        start -= 1;
    }

    (start < preceding.len()).then(|| DocComment {
        lines: preceding[start..]
            .iter()
            .flat_map(|c| comment_lines(text(*c, src)))
            .collect(),
    })
}

fn starts_line(node: Node, src: &str) -> bool {
    src[..node.start_byte()]
        .rsplit('\n')
        .next()
        .is_some_and(|prefix| prefix.trim().is_empty())
}

/// Strips comment markers. Block comments contribute one entry per line with
/// any leading `*` decoration removed.
fn comment_lines(comment: &str) -> Vec<String> {
    if let Some(line) = comment.strip_prefix("//") {
        return vec![line.to_string()];
    }
    let inner = comment
        .strip_prefix("/*")
        .and_then(|t| t.strip_suffix("*/"))
        .unwrap_or(comment);
    inner
        .lines()
        .map(|l| {
            let l = l.trim();
            l.strip_prefix('*').unwrap_or(l).to_string()
        })
        .filter(|l| !l.trim().is_empty())
        .collect()
}

fn syntax_error(root: Node, src: &str) -> ParseError {
    let Some(node) = first_error(root) else {
        return ParseError::new(1, "syntax error");
    };
    let line = line_of(node);

    if node.is_missing() {
        let message = match node.kind() {
            "}" => "'{' not closed".to_string(),
            ")" => "'(' not closed".to_string(),
            "]" => "'[' not closed".to_string(),
            kind => format!("missing {}", kind),
        };
        return ParseError::new(line, message);
    }

    if node.end_byte() >= src.trim_end().len() {
        return ParseError::new(line, "declaration not closed before end of file");
    }
    let snippet = text(node, src).lines().next().unwrap_or_default().trim();
    ParseError::new(line, format!("unexpected `{}`", snippet))
}

fn first_error<'t>(node: Node<'t>) -> Option<Node<'t>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    let mut cursor = node.walk();
    let children: Vec<Node<'t>> = node.children(&mut cursor).collect();
    children
        .into_iter()
        .filter(|c| c.has_error())
        .find_map(first_error)
}

fn named_children<'t>(node: Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor).collect()
}

fn text<'s>(node: Node, src: &'s str) -> &'s str {
    &src[node.byte_range()]
}

fn line_of(node: Node) -> usize {
    node.start_position().row + 1
}
