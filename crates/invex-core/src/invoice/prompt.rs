//! The fixed extraction prompt.

const PROMPT_HEADER: &str = "You are an expert at extracting data from invoices.

Extract the following information from this invoice text. If a field is not found, put \"Not Found\".

Invoice Text:
";

const PROMPT_SCHEMA: &str = r#"
Extract and return ONLY a valid JSON object with these exact fields:
{
    "vendor_name": "company that issued the invoice",
    "invoice_number": "invoice or reference number",
    "invoice_date": "date of invoice (format: YYYY-MM-DD if possible)",
    "due_date": "payment due date (format: YYYY-MM-DD if possible)",
    "total_amount": "total amount due (just the number, no currency symbol)",
    "currency": "currency (USD, AUD, EUR, etc)",
    "line_items": [
        {
            "description": "item description",
            "quantity": "quantity",
            "unit_price": "price per unit",
            "total": "line total"
        }
    ]
}

Return ONLY the JSON, no other text.
"#;

/// Build the extraction prompt with `invoice_text` embedded verbatim.
pub fn build_prompt(invoice_text: &str) -> String {
    let mut prompt =
        String::with_capacity(PROMPT_HEADER.len() + invoice_text.len() + PROMPT_SCHEMA.len());
    prompt.push_str(PROMPT_HEADER);
    prompt.push_str(invoice_text);
    prompt.push_str(PROMPT_SCHEMA);
    prompt
}
