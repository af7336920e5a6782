use std::fmt;

/// Machine-readable error codes for agent-friendly decision making.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    WorkbookNotFound,
    ConfigParseError,
    SheetNotFound,
    InvalidColumnLayout,
    EntityNotFound,
    CycleDetected,
    RowReadFailed,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::WorkbookNotFound => "E1001",
            Self::ConfigParseError => "E1002",
            Self::SheetNotFound => "E1003",
            Self::InvalidColumnLayout => "E1004",
            Self::EntityNotFound => "E2001",
            Self::CycleDetected => "E2003",
            Self::RowReadFailed => "E3001",
        }
    }

    /// Optional remediation hint that can be surfaced to operators and agents.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::WorkbookNotFound => {
                Some("Pass a .csv file or a directory containing one .csv file per sheet.")
            }
            Self::ConfigParseError => Some("Fix syntax in lineage.toml and retry."),
            Self::SheetNotFound => Some("Run `lineage sheets <WORKBOOK>` to list available sheets."),
            Self::InvalidColumnLayout => {
                Some("Give each [columns] entry in lineage.toml a distinct index.")
            }
            Self::EntityNotFound => None,
            Self::CycleDetected => {
                Some("Run `lineage cycles <WORKBOOK>` and fix the parent id column.")
            }
            Self::RowReadFailed => Some("Check the file is valid CSV with consistent quoting."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
