//! Legacy receipt conversion.
//!
//! The pre-document API accepted a flat `ReceiptData` record. That endpoint
//! survives as an adapter: the record is converted into a block document and
//! goes through the same pipeline as everything else, so legacy clients get
//! the new renderers for free.

use serde::{Deserialize, Serialize};

use super::{
    Align, Block, Document, DividerBlock, DividerStyle, Row, SpacerBlock, TableBlock, TableStyle,
    TextBlock, TextStyle,
};

/// One purchased line item on a legacy receipt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    pub name: String,
    pub quantity: u32,
    pub price: f64,
    pub total: f64,
}

/// The legacy flat receipt payload. Every field is optional; a receipt
/// always gets the closing courtesy line and trailing space regardless.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptData {
    #[serde(default)]
    pub store_name: Option<String>,
    #[serde(default)]
    pub store_address: Option<String>,
    #[serde(default)]
    pub store_phone: Option<String>,
    #[serde(default)]
    pub receipt_number: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub items: Vec<LineItem>,
    #[serde(default)]
    pub subtotal: Option<f64>,
    #[serde(default)]
    pub tax: Option<f64>,
    #[serde(default)]
    pub total: Option<f64>,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub footer: Option<String>,
}

fn centered(value: impl Into<String>, style: TextStyle) -> Block {
    Block::Text(TextBlock::styled(
        value,
        TextStyle {
            align: Some(Align::Center),
            ..style
        },
    ))
}

/// Convert a legacy receipt into a block document.
pub fn receipt_to_document(receipt: &ReceiptData) -> Document {
    let mut doc = Document::new();

    if let Some(name) = &receipt.store_name {
        doc.push(centered(
            name,
            TextStyle {
                bold: true,
                font_scale: Some(1.5),
                margin_bottom: Some(5),
                ..TextStyle::default()
            },
        ));
    }
    if let Some(address) = &receipt.store_address {
        doc.push(centered(
            address,
            TextStyle {
                font_scale: Some(0.9),
                ..TextStyle::default()
            },
        ));
    }
    if let Some(phone) = &receipt.store_phone {
        doc.push(centered(
            phone,
            TextStyle {
                font_scale: Some(0.9),
                margin_bottom: Some(5),
                ..TextStyle::default()
            },
        ));
    }

    doc.push(Block::Divider(DividerBlock::default()));

    if let Some(number) = &receipt.receipt_number {
        doc.push(Block::Text(TextBlock::styled(
            format!("Receipt #: {}", number),
            TextStyle {
                margin_top: Some(5),
                ..TextStyle::default()
            },
        )));
    }
    if let Some(date) = &receipt.date {
        doc.push(Block::Text(TextBlock::styled(
            format!("Date: {}", date),
            TextStyle {
                margin_bottom: Some(5),
                ..TextStyle::default()
            },
        )));
    }

    doc.push(Block::Divider(DividerBlock::default()));

    if !receipt.items.is_empty() {
        let rows = receipt
            .items
            .iter()
            .map(|item| {
                Row::Cells(vec![
                    item.name.clone(),
                    item.quantity.to_string(),
                    format!("${:.2}", item.price),
                    format!("${:.2}", item.total),
                ])
            })
            .collect();
        doc.push(Block::Table(TableBlock {
            headers: Some(vec![
                "Item".into(),
                "Qty".into(),
                "Price".into(),
                "Total".into(),
            ]),
            rows,
            style: Some(TableStyle {
                column_aligns: Some(vec![
                    Align::Left,
                    Align::Center,
                    Align::Right,
                    Align::Right,
                ]),
                margin_top: Some(5),
                margin_bottom: Some(5),
                ..TableStyle::default()
            }),
        }));
        doc.push(Block::Divider(DividerBlock::default()));
    }

    let mut total_rows = Vec::new();
    if let Some(subtotal) = receipt.subtotal {
        total_rows.push(Row::Cells(vec![
            "Subtotal:".into(),
            format!("${:.2}", subtotal),
        ]));
    }
    if let Some(tax) = receipt.tax {
        total_rows.push(Row::Cells(vec!["Tax:".into(), format!("${:.2}", tax)]));
    }
    if let Some(total) = receipt.total {
        total_rows.push(Row::Cells(vec!["TOTAL:".into(), format!("${:.2}", total)]));
    }
    if !total_rows.is_empty() {
        doc.push(Block::Table(TableBlock {
            headers: None,
            rows: total_rows,
            style: Some(TableStyle {
                column_aligns: Some(vec![Align::Left, Align::Right]),
                margin_top: Some(5),
                margin_bottom: Some(5),
                ..TableStyle::default()
            }),
        }));
    }

    if let Some(payment) = &receipt.payment_method {
        doc.push(Block::Text(TextBlock::styled(
            format!("Payment: {}", payment),
            TextStyle {
                margin_top: Some(10),
                ..TextStyle::default()
            },
        )));
    }

    doc.push(Block::Divider(DividerBlock {
        style: Some(DividerStyle {
            margin_top: Some(10),
            ..DividerStyle::default()
        }),
    }));

    if let Some(footer) = &receipt.footer {
        doc.push(centered(
            footer,
            TextStyle {
                margin_top: Some(5),
                ..TextStyle::default()
            },
        ));
    }
    doc.push(centered(
        "Thank you for your business!",
        TextStyle {
            margin_top: Some(5),
            ..TextStyle::default()
        },
    ));
    doc.push(Block::Spacer(SpacerBlock { height: Some(20) }));

    doc
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_receipt() -> ReceiptData {
        ReceiptData {
            store_name: Some("Corner Cafe".into()),
            store_address: Some("12 High St".into()),
            store_phone: Some("555-0101".into()),
            receipt_number: Some("0042".into()),
            date: Some("2026-08-29".into()),
            items: vec![
                LineItem {
                    name: "Espresso".into(),
                    quantity: 2,
                    price: 3.5,
                    total: 7.0,
                },
                LineItem {
                    name: "Croissant".into(),
                    quantity: 1,
                    price: 2.25,
                    total: 2.25,
                },
            ],
            subtotal: Some(9.25),
            tax: Some(0.74),
            total: Some(9.99),
            payment_method: Some("Card".into()),
            footer: Some("No refunds after 30 days".into()),
        }
    }

    #[test]
    fn test_full_receipt_block_sequence() {
        let doc = receipt_to_document(&sample_receipt());
        let kinds: Vec<&str> = doc
            .blocks
            .iter()
            .map(|b| match b {
                Block::Text(_) => "text",
                Block::Table(_) => "table",
                Block::Divider(_) => "divider",
                Block::Spacer(_) => "spacer",
                Block::Image(_) => "image",
                Block::Barcode(_) => "barcode",
            })
            .collect();
        assert_eq!(
            kinds,
            vec![
                "text", "text", "text", "divider", "text", "text", "divider", "table", "divider",
                "table", "text", "divider", "text", "text", "spacer",
            ]
        );
    }

    #[test]
    fn test_money_formatting() {
        let doc = receipt_to_document(&sample_receipt());
        let totals = doc
            .blocks
            .iter()
            .filter_map(|b| match b {
                Block::Table(t) if t.headers.is_none() => Some(t),
                _ => None,
            })
            .next()
            .unwrap();
        assert!(matches!(
            &totals.rows[2],
            Row::Cells(cells) if cells == &vec!["TOTAL:".to_string(), "$9.99".to_string()]
        ));
    }

    #[test]
    fn test_empty_receipt_still_closes() {
        let doc = receipt_to_document(&ReceiptData::default());
        // Two section dividers, the closing divider, courtesy line, spacer.
        assert_eq!(doc.blocks.len(), 5);
        assert!(matches!(
            doc.blocks.last().unwrap(),
            Block::Spacer(s) if s.height == Some(20)
        ));
        assert!(matches!(
            &doc.blocks[3],
            Block::Text(t) if t.value == "Thank you for your business!"
        ));
    }

    #[test]
    fn test_item_table_shape() {
        let doc = receipt_to_document(&sample_receipt());
        let items = doc
            .blocks
            .iter()
            .filter_map(|b| match b {
                Block::Table(t) if t.headers.is_some() => Some(t),
                _ => None,
            })
            .next()
            .unwrap();
        assert_eq!(items.column_count(), 4);
        assert_eq!(items.rows.len(), 2);
    }
}
