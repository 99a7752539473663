//! Responsive layout selection

use serde::{Deserialize, Serialize};
use tabula_core::{ColumnDescriptor, Viewport};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutMode {
    /// Every visible column
    Table,
    /// Table without action columns
    ReducedTable,
    /// One stacked card per record
    Cards,
}

/// Column roles inside a mobile card, as indices into the column set
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CardLayout {
    pub title: Option<usize>,
    /// Label/value rows in declaration order
    pub fields: Vec<usize>,
    /// Trailing action block
    pub actions: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layout {
    pub mode: LayoutMode,
    pub viewport: Viewport,
    /// Indices of the columns that render, in declaration order
    pub visible_columns: Vec<usize>,
    /// Set in card mode
    pub card: Option<CardLayout>,
    pub sort_affordances: bool,
    pub filter_triggers: bool,
}

impl Layout {
    pub fn is_cards(&self) -> bool {
        self.mode == LayoutMode::Cards
    }
}

pub fn choose_layout(viewport: Viewport, columns: &[ColumnDescriptor]) -> Layout {
    let shown = columns
        .iter()
        .enumerate()
        .filter(|(_, column)| !column.hidden);

    match viewport {
        Viewport::Desktop => Layout {
            mode: LayoutMode::Table,
            viewport,
            visible_columns: shown.map(|(idx, _)| idx).collect(),
            card: None,
            sort_affordances: true,
            filter_triggers: true,
        },
        Viewport::Tablet => Layout {
            mode: LayoutMode::ReducedTable,
            viewport,
            visible_columns: shown
                .filter(|(_, column)| !column.is_actions())
                .map(|(idx, _)| idx)
                .collect(),
            card: None,
            sort_affordances: true,
            filter_triggers: true,
        },
        Viewport::Mobile => {
            let mut card = CardLayout::default();
            let mut visible_columns = Vec::new();
            for (idx, column) in shown {
                visible_columns.push(idx);
                if column.is_actions() {
                    card.actions.push(idx);
                } else if card.title.is_none() {
                    card.title = Some(idx);
                } else {
                    card.fields.push(idx);
                }
            }
            Layout {
                mode: LayoutMode::Cards,
                viewport,
                visible_columns,
                card: Some(card),
                sort_affordances: false,
                filter_triggers: false,
            }
        }
    }
}
