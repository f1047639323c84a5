use std::fs;
use std::path::Path;

use log::warn;

use super::ShaderStage;
use crate::error::Result;

const MARKER: &str = "#shader";

/// The per-stage sources of an annotated shader file. Such a file contains blocks introduced by
/// a marker line like `#shader vertex` or `#shader fragment`. Every line after a marker belongs
/// to that stage, until the next marker. Blocks may appear in any order.
///
/// ```glsl
/// #shader vertex
/// #version 330 core
/// layout(location = 0) in vec4 position;
/// void main() { gl_Position = position; }
///
/// #shader fragment
/// #version 330 core
/// layout(location = 0) out vec4 color;
/// void main() { color = vec4(1.0); }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShaderSource {
    pub vertex: String,
    pub fragment: String,
}

impl ShaderSource {
    /// Splits annotated source text into per-stage sources. A stage without a block is left as
    /// an empty string. Lines before the first marker, and lines in blocks for unknown stages,
    /// are dropped.
    pub fn parse(text: &str) -> ShaderSource {
        let mut result = ShaderSource::default();
        let mut current: Option<ShaderStage> = None;

        for line in text.lines() {
            if line.contains(MARKER) {
                current = if line.contains("vertex") {
                    Some(ShaderStage::Vertex)
                } else if line.contains("fragment") {
                    Some(ShaderStage::Fragment)
                } else {
                    warn!("Ignoring block for unknown shader stage: \"{}\"", line.trim());
                    None
                };
                continue;
            }

            let target = match current {
                Some(ShaderStage::Vertex)   => &mut result.vertex,
                Some(ShaderStage::Fragment) => &mut result.fragment,
                None                        => continue,
            };
            target.push_str(line);
            target.push('\n');
        }

        result
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<ShaderSource> {
        let text = fs::read_to_string(path)?;
        Ok(ShaderSource::parse(&text))
    }

    pub fn stage(&self, stage: ShaderStage) -> &str {
        match stage {
            ShaderStage::Vertex   => &self.vertex,
            ShaderStage::Fragment => &self.fragment,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_blocks() {
        let source = ShaderSource::parse("#shader vertex\nA\n#shader fragment\nB\n");
        assert_eq!(source.vertex, "A\n");
        assert_eq!(source.fragment, "B\n");
    }

    #[test]
    fn blocks_in_any_order() {
        let source = ShaderSource::parse("#shader fragment\nf1\nf2\n#shader vertex\nv1\n\nv2\n");
        assert_eq!(source.fragment, "f1\nf2\n");
        assert_eq!(source.vertex, "v1\n\nv2\n");
    }

    #[test]
    fn missing_stage_is_empty() {
        let source = ShaderSource::parse("#shader vertex\nvoid main() {}\n");
        assert_eq!(source.vertex, "void main() {}\n");
        assert_eq!(source.fragment, "");
    }

    #[test]
    fn non_marker_lines_are_preserved() {
        let text = "#shader vertex\na\nb\n#shader fragment\nc\n#shader vertex\nd\n";
        let source = ShaderSource::parse(text);

        let mut lines: Vec<&str> = source.vertex.lines().chain(source.fragment.lines()).collect();
        lines.sort();
        assert_eq!(lines, vec!["a", "b", "c", "d"]);
        assert_eq!(source.vertex, "a\nb\nd\n");
    }

    #[test]
    fn lines_outside_blocks_are_dropped() {
        let source = ShaderSource::parse("// header\n#shader geometry\ng\n#shader fragment\nf");
        assert_eq!(source.vertex, "");
        assert_eq!(source.fragment, "f\n");
    }
}
