/// Builds the fixed generation prompt sent to every backend.
///
/// The template is deliberately identical across backends so that switching
/// backends changes only the transport, not the request semantics.
pub fn build_prompt(question: &str, columns: &[String]) -> String {
    format!(
        "Generate an optimized and accurate SQL query for: '{}'. \
         The available columns are {}. \
         Ensure proper syntax and efficiency.",
        question,
        format_columns(columns)
    )
}

/// Renders the column list as `['a', 'b', 'c']`; an empty list renders `[]`.
pub fn format_columns(columns: &[String]) -> String {
    let quoted: Vec<String> = columns.iter().map(|c| format!("'{}'", c)).collect();
    format!("[{}]", quoted.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn prompt_uses_the_fixed_template() {
        let prompt = build_prompt("total sales by region", &cols(&["region", "amount"]));
        assert_eq!(
            prompt,
            "Generate an optimized and accurate SQL query for: 'total sales by region'. \
             The available columns are ['region', 'amount']. \
             Ensure proper syntax and efficiency."
        );
    }

    #[test]
    fn columns_render_in_order_with_duplicates_kept() {
        assert_eq!(
            format_columns(&cols(&["id", "name", "id"])),
            "['id', 'name', 'id']"
        );
    }

    #[test]
    fn empty_column_list_renders_empty_brackets() {
        assert_eq!(format_columns(&[]), "[]");
    }
}
