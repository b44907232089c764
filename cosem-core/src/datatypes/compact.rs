//! Compact array model: one shared type template plus untagged rows
//!
//! Buffered data reporting the same column layout thousands of times
//! would repeat the tag stream for every row. The compact form carries
//! the tags once, in a template, and the rows as untagged cells.

use crate::datatypes::value::{DataObject, DataObjectType};
use crate::error::{DlmsError, DlmsResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Type template shared by every row of a compact array.
///
/// Leaf entries carry a single type tag and no value; container entries
/// recurse, so nested array and structure columns are expressible.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TypeDescription {
    Scalar(DataObjectType),
    /// Fixed element count, one shared element template
    Array {
        count: u16,
        element: Box<TypeDescription>,
    },
    Structure(Vec<TypeDescription>),
}

impl TypeDescription {
    /// Number of cells one row holds under this template
    pub fn column_count(&self) -> usize {
        match self {
            TypeDescription::Structure(members) => members.len(),
            _ => 1,
        }
    }

    /// Reject templates that cannot describe row data.
    ///
    /// A scalar leaf must consume a knowable number of bytes, so the
    /// container tags and null cannot appear as leaves; an empty
    /// structure would make rows zero-sized.
    pub fn validate(&self) -> DlmsResult<()> {
        match self {
            TypeDescription::Scalar(kind) => {
                if kind.is_container() || matches!(kind, DataObjectType::NullData | DataObjectType::DontCare) {
                    return Err(DlmsError::InvalidData(format!(
                        "Type {:?} is not a valid template leaf",
                        kind
                    )));
                }
                Ok(())
            }
            TypeDescription::Array { element, .. } => element.validate(),
            TypeDescription::Structure(members) => {
                if members.is_empty() {
                    return Err(DlmsError::InvalidData(
                        "Template structure must have at least one member".to_string(),
                    ));
                }
                members.iter().try_for_each(TypeDescription::validate)
            }
        }
    }
}

/// A compact array: template description plus decoded rows.
///
/// Each row holds one cell per top-level template column; an omitted
/// cell is [`DataObject::Null`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompactArray {
    template: TypeDescription,
    rows: Vec<Vec<DataObject>>,
}

impl CompactArray {
    pub fn new(template: TypeDescription, rows: Vec<Vec<DataObject>>) -> DlmsResult<Self> {
        template.validate()?;
        let columns = template.column_count();
        for (index, row) in rows.iter().enumerate() {
            if row.len() != columns {
                return Err(DlmsError::InvalidData(format!(
                    "Row {} has {} cell(s), template describes {}",
                    index,
                    row.len(),
                    columns
                )));
            }
        }
        Ok(Self { template, rows })
    }

    pub fn template(&self) -> &TypeDescription {
        &self.template
    }

    pub fn rows(&self) -> &[Vec<DataObject>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn push_row(&mut self, row: Vec<DataObject>) -> DlmsResult<()> {
        if row.len() != self.template.column_count() {
            return Err(DlmsError::InvalidData(format!(
                "Row has {} cell(s), template describes {}",
                row.len(),
                self.template.column_count()
            )));
        }
        self.rows.push(row);
        Ok(())
    }
}

impl fmt::Display for CompactArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "compact-array({} column(s), {} row(s))",
            self.template.column_count(),
            self.rows.len()
        )
    }
}
