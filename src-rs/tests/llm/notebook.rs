use crate::llm::notebook::{format_notebook, Cell, CellKind, NotebookSnapshot, Output};
use serde_json::json;

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(value: serde_json::Value) -> NotebookSnapshot {
        serde_json::from_value(value).expect("snapshot should parse")
    }

    #[test]
    fn empty_snapshot_renders_empty_string() {
        assert_eq!(format_notebook(&NotebookSnapshot::default()), "");
        assert_eq!(format_notebook(&snapshot(json!({}))), "");
    }

    #[test]
    fn code_and_markdown_cells_render_in_order() {
        let nb = NotebookSnapshot {
            cells: vec![
                Cell::code("x = 1", vec![Output::Text("ok\n".to_string())]),
                Cell::markdown("# Notes"),
            ],
        };
        assert_eq!(
            format_notebook(&nb),
            "Cell [0] (Code):\n```python\nx = 1\n```\n\nOutput:\n```\nok\n\n```\n\nCell [1] (Markdown):\n# Notes"
        );
    }

    #[test]
    fn multiline_sources_are_joined() {
        let nb = snapshot(json!({
            "cells": [{ "cell_type": "code", "source": ["import os\n", "print(os.sep)"] }]
        }));
        assert_eq!(nb.cells[0].source, "import os\nprint(os.sep)");
        assert_eq!(
            format_notebook(&nb),
            "Cell [0] (Code):\n```python\nimport os\nprint(os.sep)\n```"
        );
    }

    #[test]
    fn other_cell_kinds_are_skipped_but_keep_positions() {
        let nb = snapshot(json!({
            "cells": [
                { "cell_type": "raw", "source": "ignored" },
                { "source": "no type" },
                { "cell_type": "markdown", "source": "kept" }
            ]
        }));
        assert_eq!(nb.cells[0].kind, CellKind::Other);
        assert_eq!(nb.cells[1].kind, CellKind::Other);
        assert_eq!(format_notebook(&nb), "Cell [2] (Markdown):\nkept");
    }

    #[test]
    fn output_shapes_follow_priority() {
        let both: Output = serde_json::from_value(json!({
            "data": { "text/plain": "plain" },
            "text": "stream"
        }))
        .unwrap();
        assert_eq!(both, Output::PlainData("plain".to_string()));

        let image_and_text: Output = serde_json::from_value(json!({
            "data": { "image/png": "iVBOR" },
            "text": ["a\n", "b"]
        }))
        .unwrap();
        assert_eq!(image_and_text, Output::Text("a\nb".to_string()));

        let tb: Output = serde_json::from_value(json!({
            "ename": "ZeroDivisionError",
            "traceback": ["Traceback", "ZeroDivisionError: division by zero"]
        }))
        .unwrap();
        assert_eq!(
            tb.fragment().as_deref(),
            Some("Traceback\nZeroDivisionError: division by zero")
        );

        let image_only: Output =
            serde_json::from_value(json!({ "data": { "image/png": "iVBOR" } })).unwrap();
        assert_eq!(image_only, Output::Unrecognized);
        assert!(image_only.fragment().is_none());
    }

    #[test]
    fn output_fragments_are_concatenated_without_separator() {
        let nb = snapshot(json!({
            "cells": [{
                "cell_type": "code",
                "source": "print(1); 2",
                "outputs": [
                    { "name": "stdout", "text": "1\n" },
                    { "data": { "text/plain": "2" } }
                ]
            }]
        }));
        assert!(format_notebook(&nb).ends_with("Output:\n```\n1\n2\n```"));
    }

    #[test]
    fn code_cell_without_recognized_output_has_no_output_block() {
        let nb = snapshot(json!({
            "cells": [{
                "cell_type": "code",
                "source": "plot()",
                "outputs": [{ "data": { "image/png": "iVBOR" } }]
            }]
        }));
        let rendered = format_notebook(&nb);
        assert!(!rendered.contains("Output:"));
    }

    #[test]
    fn formatting_is_deterministic() {
        let nb = snapshot(json!({
            "cells": [
                { "cell_type": "code", "source": "a", "outputs": [{ "text": "b" }] },
                { "cell_type": "markdown", "source": "c" }
            ]
        }));
        assert_eq!(format_notebook(&nb), format_notebook(&nb));
    }
}
