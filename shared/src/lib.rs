use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Number of subjects every student is marked on
pub const SUBJECT_COUNT: usize = 5;

/// One mark per subject, in the order of `GradeSystemData::subjects`
pub type Marks = [u8; SUBJECT_COUNT];

/// Identity of the person operating the mini projects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentInfo {
    pub name: String,
    pub roll_number: String,
    pub college: String,
    pub subject: String,
    pub email: String,
    /// Optional avatar reference (URL or data URI)
    #[serde(default)]
    pub avatar: Option<String>,
    /// Profile accent theme, independent from the application theme
    #[serde(default = "default_profile_theme")]
    pub theme: String,
}

fn default_profile_theme() -> String {
    "cyber-blue".to_string()
}

impl Default for StudentInfo {
    fn default() -> Self {
        Self {
            name: String::new(),
            roll_number: String::new(),
            college: String::new(),
            subject: String::new(),
            email: String::new(),
            avatar: None,
            theme: default_profile_theme(),
        }
    }
}

impl StudentInfo {
    /// A profile is complete once name, roll number and college are filled in
    pub fn is_complete(&self) -> bool {
        [&self.name, &self.roll_number, &self.college]
            .iter()
            .all(|field| !field.trim().is_empty())
    }
}

/// Partial update for `StudentInfo`; absent fields keep their current value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentInfoPatch {
    pub name: Option<String>,
    pub roll_number: Option<String>,
    pub college: Option<String>,
    pub subject: Option<String>,
    pub email: Option<String>,
    pub avatar: Option<String>,
    pub theme: Option<String>,
}

/// Application-wide toggles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    pub theme: String,
    pub animations: bool,
    pub sound_effects: bool,
    pub language: String,
    pub notifications: bool,
    pub auto_save: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            theme: "dark".to_string(),
            animations: true,
            sound_effects: false,
            language: "en".to_string(),
            notifications: true,
            auto_save: true,
        }
    }
}

/// Partial update for `AppSettings`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSettingsPatch {
    pub theme: Option<String>,
    pub animations: Option<bool>,
    pub sound_effects: Option<bool>,
    pub language: Option<String>,
    pub notifications: Option<bool>,
    pub auto_save: Option<bool>,
}

/// A single evaluated calculator expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationEntry {
    /// Human-readable expression, e.g. "12 * 3"
    pub expression: String,
    pub result: f64,
    /// ISO-8601 timestamp (UTC, millisecond precision)
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculatorData {
    /// Oldest first, bounded to the most recent entries
    pub history: Vec<CalculationEntry>,
    #[serde(default)]
    pub last_result: Option<f64>,
    pub memory: f64,
}

impl Default for CalculatorData {
    fn default() -> Self {
        Self {
            history: Vec::new(),
            last_result: None,
            memory: 0.0,
        }
    }
}

/// Letter grade on the fixed grading scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    /// All grades, best first
    pub const ALL: [Grade; 5] = [Grade::A, Grade::B, Grade::C, Grade::D, Grade::F];

    /// Inclusive lower bound of the average for this grade
    pub fn min_score(self) -> u8 {
        match self {
            Grade::A => 90,
            Grade::B => 80,
            Grade::C => 70,
            Grade::D => 60,
            Grade::F => 0,
        }
    }

    pub fn max_score(self) -> u8 {
        match self {
            Grade::A => 100,
            Grade::B => 89,
            Grade::C => 79,
            Grade::D => 69,
            Grade::F => 59,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Grade::A => "Excellent",
            Grade::B => "Good",
            Grade::C => "Average",
            Grade::D => "Below Average",
            Grade::F => "Fail",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        };
        write!(f, "{}", letter)
    }
}

/// Score band of a grade as shown on the grading scale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeBand {
    pub min: u8,
    pub max: u8,
    pub description: String,
}

/// Outcome of grading a set of marks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeResult {
    pub total: u32,
    /// Rounded to 2 decimals
    pub average: f64,
    pub grade: Grade,
    pub description: String,
}

/// A graded student record. `total`, `average`, `grade` and `description`
/// are always derived from `marks`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: u64,
    pub name: String,
    pub marks: Marks,
    pub total: u32,
    pub average: f64,
    pub grade: Grade,
    pub description: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub evaluated_by: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewStudent {
    pub name: String,
    pub marks: Marks,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StudentPatch {
    pub name: Option<String>,
    pub marks: Option<Marks>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeSystemData {
    pub students: Vec<Student>,
    pub subjects: Vec<String>,
    pub grading_scale: BTreeMap<Grade, GradeBand>,
    /// Highest student id ever handed out, so ids are never reused
    #[serde(default)]
    pub last_student_id: u64,
}

impl Default for GradeSystemData {
    fn default() -> Self {
        let subjects = ["Mathematics", "Physics", "Chemistry", "English", "Computer Science"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let grading_scale = Grade::ALL
            .iter()
            .map(|grade| {
                (
                    *grade,
                    GradeBand {
                        min: grade.min_score(),
                        max: grade.max_score(),
                        description: grade.description().to_string(),
                    },
                )
            })
            .collect();

        Self {
            students: Vec::new(),
            subjects,
            grading_scale,
            last_student_id: 0,
        }
    }
}

/// Entry in an account's transaction ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountTransaction {
    /// Label such as "Initial Deposit", "Deposit" or "Withdrawal"
    #[serde(rename = "type")]
    pub transaction_type: String,
    /// Absolute value of the balance change
    pub amount: f64,
    /// Account balance after this transaction
    pub balance: f64,
    /// RFC 3339 timestamp
    pub date: String,
    pub description: String,
}

/// Bank account in format "ACC" + zero-padded sequence number
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub name: String,
    pub age: u32,
    pub phone: String,
    pub balance: f64,
    /// Append-only, oldest first; the last entry carries the current balance
    pub transactions: Vec<AccountTransaction>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub created_by: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAccount {
    pub name: String,
    pub age: u32,
    pub phone: String,
    /// Opening deposit
    pub balance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankSystemData {
    pub accounts: Vec<Account>,
    pub total_balance: f64,
    /// Next sequence number to hand out; never decremented
    pub account_counter: u32,
}

impl Default for BankSystemData {
    fn default() -> Self {
        Self {
            accounts: Vec::new(),
            total_balance: 0.0,
            account_counter: 1,
        }
    }
}

/// Everything that survives a restart. Sections missing from a stored
/// snapshot fall back to their defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersistedState {
    pub student_info: StudentInfo,
    pub app_settings: AppSettings,
    pub calculator_data: CalculatorData,
    pub grade_system_data: GradeSystemData,
    pub bank_system_data: BankSystemData,
}

/// Versioned envelope written to the durable snapshot slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedSnapshot {
    pub state: PersistedState,
    pub version: u32,
}

/// User-facing backup document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub student_info: StudentInfo,
    pub calculator_data: CalculatorData,
    pub grade_system_data: GradeSystemData,
    pub bank_system_data: BankSystemData,
    pub exported_at: String,
}

// ---------------------------------------------------------------------------
// Request / response types for the REST surface
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateResponse {
    #[serde(flatten)]
    pub state: PersistedState,
    pub profile_complete: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluateRequest {
    pub first: f64,
    pub second: f64,
    /// One of "+", "-", "*", "/" (also "×" and "÷")
    pub operator: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluateResponse {
    pub result: f64,
    pub entry: CalculationEntry,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryRequest {
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradePreviewRequest {
    pub marks: Marks,
}

/// Aggregates shown on the grade dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeStats {
    pub total_students: usize,
    /// Mean of all student averages
    pub average_score: f64,
    pub distribution: BTreeMap<Grade, usize>,
    /// Share of A and B grades, in whole percent
    pub pass_rate: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradesResponse {
    pub students: Vec<Student>,
    pub subjects: Vec<String>,
    pub grading_scale: BTreeMap<Grade, GradeBand>,
    pub stats: GradeStats,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentResponse {
    pub student: Student,
    pub success_message: String,
}

/// Aggregates shown on the bank dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountStats {
    pub account_count: usize,
    pub total_balance: f64,
    pub highest: f64,
    pub lowest: f64,
    pub average: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankResponse {
    pub accounts: Vec<Account>,
    pub total_balance: f64,
    pub account_counter: u32,
    pub stats: AccountStats,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    pub account: Account,
    pub success_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoneyRequest {
    pub amount: f64,
}

/// Raw signed balance change (positive credits, negative debits)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceChangeRequest {
    pub amount: f64,
    #[serde(rename = "type")]
    pub transaction_type: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResponse {
    pub imported_sections: Vec<String>,
    pub success_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetResponse {
    pub success_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub level: String,
    pub message: String,
    #[serde(default)]
    pub component: Option<String>,
}

// ---------------------------------------------------------------------------
// Formatting helpers
// ---------------------------------------------------------------------------

/// Build an account id from its sequence number: 7 -> "ACC007"
pub fn generate_account_number(counter: u32) -> String {
    format!("ACC{:03}", counter)
}

/// Recover the sequence number from an account id: "ACC042" -> 42
pub fn account_sequence(account_id: &str) -> Option<u32> {
    account_id.strip_prefix("ACC")?.parse().ok()
}

/// Format an amount as US dollars, e.g. 1234.5 -> "$1,234.50"
pub fn format_currency(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let digits = (cents / 100).to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}${}.{:02}", sign, grouped, cents % 100)
}
