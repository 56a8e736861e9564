//! Graphviz DOT sink
//!
//! Containers describe their internal shape by appending nodes and edges to a
//! [`DotGraph`]; the rendered text is only a diagnostic and carries no
//! correctness contract.
//!
//! ```rust
//! use rust_advanced_collections::dot::DotGraph;
//!
//! let mut graph = DotGraph::new("example");
//! graph.node("a", "root");
//! graph.node("b", "leaf \"1\"");
//! graph.edge("a", "b");
//! let text = graph.to_string();
//! assert!(text.starts_with("digraph example {"));
//! assert!(text.contains("a -> b;"));
//! assert!(text.contains(r#"label="leaf \"1\"""#));
//! ```

use std::fmt::{self, Display, Write};

/// An append-only DOT digraph
#[derive(Debug, Clone, Default)]
pub struct DotGraph {
    name: String,
    body: Vec<String>,
}

impl DotGraph {
    /// Starts an empty digraph
    pub fn new(name: &str) -> Self {
        Self {
            name: sanitize_id(name),
            body: vec!["node [shape=record, fontsize=10];".to_string()],
        }
    }

    /// Appends a node with a label
    pub fn node(&mut self, id: impl Display, label: impl Display) -> &mut Self {
        self.body.push(format!(
            "{} [label=\"{}\"];",
            sanitize_id(&id.to_string()),
            escape(&label.to_string())
        ));
        self
    }

    /// Appends a plain edge
    pub fn edge(&mut self, from: impl Display, to: impl Display) -> &mut Self {
        self.body.push(format!(
            "{} -> {};",
            sanitize_id(&from.to_string()),
            sanitize_id(&to.to_string())
        ));
        self
    }

    /// Appends an edge carrying raw DOT attributes, e.g. `style=dashed`
    pub fn edge_with(&mut self, from: impl Display, to: impl Display, attrs: &str) -> &mut Self {
        self.body.push(format!(
            "{} -> {} [{}];",
            sanitize_id(&from.to_string()),
            sanitize_id(&to.to_string()),
            attrs
        ));
        self
    }
}

impl Display for DotGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "digraph {} {{", self.name)?;
        for line in &self.body {
            writeln!(f, "    {}", line)?;
        }
        f.write_char('}')
    }
}

fn sanitize_id(id: &str) -> String {
    let cleaned: String = id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    if cleaned.is_empty() || cleaned.starts_with(|c: char| c.is_ascii_digit()) {
        format!("n{}", cleaned)
    } else {
        cleaned
    }
}

fn escape(label: &str) -> String {
    let mut out = String::with_capacity(label.len());
    for c in label.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '{' | '}' | '|' | '<' | '>' => {
                out.push('\\');
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_sanitized() {
        assert_eq!(sanitize_id("node-1"), "node_1");
        assert_eq!(sanitize_id("7"), "n7");
        assert_eq!(sanitize_id(""), "n");
    }

    #[test]
    fn test_render() {
        let mut graph = DotGraph::new("heap");
        graph.node(1, "k=1").node(2, "k=2").edge(1, 2);
        graph.edge_with(2, 1, "style=dashed");

        let text = graph.to_string();
        assert!(text.contains("n1 [label=\"k=1\"];"));
        assert!(text.contains("n1 -> n2;"));
        assert!(text.contains("n2 -> n1 [style=dashed];"));
        assert!(text.ends_with('}'));
    }

    #[test]
    fn test_record_characters_escaped() {
        assert_eq!(escape("a|b{c}"), "a\\|b\\{c\\}");
    }
}
