use crate::error::DinheiroError;
use crate::spreadsheet::Criteria;
use crate::spreadsheet::Spreadsheet;
use crate::spreadsheet::Table;
use crate::valuation::ValuationError;
use serde::Serialize;
use std::fmt::Display;

/// Semantic role a spreadsheet column can play.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ColumnRole {
    Ticker,
    CompanyName,
    FairPrice,
    DividendYield,
    DividendPerShare,
}

impl ColumnRole {
    /// All roles, in resolution order
    pub const ALL: [ColumnRole; 5] = [
        ColumnRole::Ticker,
        ColumnRole::CompanyName,
        ColumnRole::FairPrice,
        ColumnRole::DividendYield,
        ColumnRole::DividendPerShare,
    ];

    /// Substring searched for in the uppercased header text
    pub const fn keyword(&self) -> &'static str {
        match self {
            ColumnRole::Ticker => "TICKER",
            ColumnRole::CompanyName => "EMPRESA",
            ColumnRole::FairPrice => "BAZIN",
            ColumnRole::DividendYield => "DY",
            ColumnRole::DividendPerShare => "DPA",
        }
    }

    const fn slot(&self) -> usize {
        match self {
            ColumnRole::Ticker => 0,
            ColumnRole::CompanyName => 1,
            ColumnRole::FairPrice => 2,
            ColumnRole::DividendYield => 3,
            ColumnRole::DividendPerShare => 4,
        }
    }
}

impl Display for ColumnRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ColumnRole::Ticker => "ticker",
            ColumnRole::CompanyName => "company name",
            ColumnRole::FairPrice => "fair price",
            ColumnRole::DividendYield => "dividend yield",
            ColumnRole::DividendPerShare => "dividend per share",
        };
        write!(f, "{}", name)
    }
}

/// A header matched to a role, with its position in the row.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ResolvedColumn {
    pub header: String,
    pub index: usize,
}

/// Mapping from every [`ColumnRole`] to the header that matched it, if any.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ColumnRoleMap {
    columns: [Option<ResolvedColumn>; 5],
}

impl ColumnRoleMap {
    pub fn get(&self, role: ColumnRole) -> Option<&ResolvedColumn> {
        self.columns[role.slot()].as_ref()
    }

    pub fn header(&self, role: ColumnRole) -> Option<&str> {
        self.get(role).map(|column| column.header.as_str())
    }

    pub fn index(&self, role: ColumnRole) -> Option<usize> {
        self.get(role).map(|column| column.index)
    }

    /// True when the mandatory ticker and fair-price roles both resolved
    pub fn is_valuation_sheet(&self) -> bool {
        self.get(ColumnRole::Ticker).is_some() && self.get(ColumnRole::FairPrice).is_some()
    }

    /// Iterates over resolved roles in [`ColumnRole::ALL`] order
    pub fn resolved(&self) -> impl Iterator<Item = (ColumnRole, &ResolvedColumn)> {
        ColumnRole::ALL
            .into_iter()
            .filter_map(|role| self.get(role).map(|column| (role, column)))
    }
}

/// Assigns each role the first header whose uppercased text contains its keyword.
///
/// Matching is a plain substring test, so `DY` also hits headers such as
/// `"STUDY"`; ties always go to the leftmost column. One header may serve
/// several roles.
pub fn resolve_columns(headers: &[String]) -> ColumnRoleMap {
    let uppercased: Vec<String> = headers.iter().map(|header| header.trim().to_uppercase()).collect();
    let mut map = ColumnRoleMap::default();
    for role in ColumnRole::ALL {
        map.columns[role.slot()] = uppercased
            .iter()
            .position(|header| header.contains(role.keyword()))
            .map(|index| ResolvedColumn {
                header: headers[index].to_owned(),
                index,
            });
    }
    map
}

/// The sheet chosen for valuation together with its resolved columns.
#[derive(Clone, Debug, PartialEq)]
pub struct ValuationSheet {
    pub table: Table,
    pub roles: ColumnRoleMap,
}

/// Returns the first table, in order, whose headers resolve both mandatory roles.
///
/// Tables are pulled one at a time, so tables after the selected one are
/// never produced. A table that fails to load aborts the search.
pub fn select_valuation_sheet<I>(source: &str, tables: I) -> Result<ValuationSheet, DinheiroError>
where
    I: IntoIterator<Item = Result<Table, DinheiroError>>,
{
    for table in tables {
        let table = table?;
        let roles = resolve_columns(&table.headers);
        if roles.is_valuation_sheet() {
            tracing::debug!(sheet = %table.name, "Valuation sheet selected");
            return Ok(ValuationSheet { table, roles });
        }
        tracing::debug!(sheet = %table.name, headers = ?table.headers, "Sheet skipped, missing ticker or fair price column");
    }
    Err(ValuationError::SchemaNotFound(source.to_owned()))?
}

/// Reads candidate sheets in file order and stops at the first valuation sheet.
pub fn find_valuation_sheet(
    spreadsheet: &mut dyn Spreadsheet,
    criteria: &Criteria,
) -> Result<ValuationSheet, DinheiroError> {
    let source = spreadsheet.name();
    let sheet_names = spreadsheet.sheet_names();
    let tables = sheet_names
        .iter()
        .filter(|sheet_name| criteria.accept(sheet_name))
        .map(|sheet_name| spreadsheet.read_sheet(sheet_name));
    select_valuation_sheet(&source, tables)
}
