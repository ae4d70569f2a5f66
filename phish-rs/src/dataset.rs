//! Labeled datasets for training
//!
//! Real datasets are CSV files with `text` and `label` columns. When none is
//! available the trainer falls back to a small bundled bootstrap set.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::config::TrainingConfig;
use crate::error::{PhishError, Result};
use crate::types::{Label, TrainingExample};

#[derive(Debug, Deserialize)]
struct CsvRow {
    text: String,
    label: String,
}

#[derive(Debug, Serialize)]
struct CsvRowRef<'a> {
    text: &'a str,
    label: &'a str,
}

/// Where a dataset came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetOrigin {
    File(PathBuf),
    Synthetic,
}

/// Examples plus their provenance
#[derive(Debug, Clone)]
pub struct Dataset {
    pub examples: Vec<TrainingExample>,
    pub origin: DatasetOrigin,
}

impl Dataset {
    /// (phishing, legitimate) counts
    pub fn class_counts(&self) -> (usize, usize) {
        class_counts(&self.examples)
    }
}

pub fn class_counts(examples: &[TrainingExample]) -> (usize, usize) {
    let phishing = examples
        .iter()
        .filter(|e| e.label == Label::Phishing)
        .count();
    (phishing, examples.len() - phishing)
}

/// Read a CSV dataset. Extra columns are ignored; labels are case-insensitive.
pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<Vec<TrainingExample>> {
    let path = path.as_ref();
    let mut reader = csv::Reader::from_path(path)?;
    let mut examples = Vec::new();

    for (index, row) in reader.deserialize::<CsvRow>().enumerate() {
        let row = row?;
        // Header is line 1
        let line = index + 2;
        let label = row.label.parse::<Label>().map_err(|_| {
            PhishError::Dataset(format!(
                "{} line {}: unknown label '{}'",
                path.display(),
                line,
                row.label
            ))
        })?;
        examples.push(TrainingExample::new(row.text, label));
    }

    if examples.is_empty() {
        return Err(PhishError::Dataset(format!(
            "{} contains no examples",
            path.display()
        )));
    }

    Ok(examples)
}

/// Write examples as a `text,label` CSV, creating parent directories
pub fn write_csv<P: AsRef<Path>>(path: P, examples: &[TrainingExample]) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut writer = csv::Writer::from_path(path)?;
    for example in examples {
        writer.serialize(CsvRowRef {
            text: &example.text,
            label: example.label.as_str(),
        })?;
    }
    writer.flush()?;

    Ok(())
}

/// Use the configured dataset if present, otherwise the bootstrap set
/// (which is also written to `sample_path` for inspection)
pub fn load_or_synthesize(config: &TrainingConfig) -> Result<Dataset> {
    let path = Path::new(&config.dataset_path);
    if path.exists() {
        let examples = load_csv(path)?;
        info!("Loaded {} examples from {}", examples.len(), path.display());
        return Ok(Dataset {
            examples,
            origin: DatasetOrigin::File(path.to_path_buf()),
        });
    }

    warn!(
        "{} not found, generating bootstrap dataset",
        config.dataset_path
    );
    let examples = synthetic(config.seed);
    write_csv(&config.sample_path, &examples)?;

    let (phishing, legitimate) = class_counts(&examples);
    info!(
        "Bootstrap dataset created with {} examples at {} (phishing: {}, legitimate: {})",
        examples.len(),
        config.sample_path,
        phishing,
        legitimate
    );

    Ok(Dataset {
        examples,
        origin: DatasetOrigin::Synthetic,
    })
}

/// The bundled bootstrap set, shuffled with `seed`
pub fn synthetic(seed: u64) -> Vec<TrainingExample> {
    let mut examples: Vec<TrainingExample> = PHISHING_EXAMPLES
        .iter()
        .map(|text| TrainingExample::new(*text, Label::Phishing))
        .chain(
            LEGITIMATE_EXAMPLES
                .iter()
                .map(|text| TrainingExample::new(*text, Label::Legitimate)),
        )
        .collect();

    let mut rng = StdRng::seed_from_u64(seed);
    examples.shuffle(&mut rng);
    examples
}

const PHISHING_EXAMPLES: [&str; 60] = [
    // Banking
    "URGENT: Your bank account will be closed. Verify now",
    "Your PayPal account has been limited. Click here to restore",
    "Alert: Unusual activity detected. Confirm your identity immediately",
    "Your account will be suspended. Update your information",
    "Security alert: Verify your credit card details now",
    "http://secure-paypal-verify.com/login",
    "http://chase-bank-security.net/update",
    "http://wellsfargo-alert.com/verify",
    "http://192.168.1.100/admin/login",
    "http://bankofamerica-secure.org/signin",
    // Tech companies
    "Your Apple ID has been locked. Verify immediately",
    "Microsoft account security alert. Click to verify",
    "Your Amazon order failed. Update payment method",
    "Google account suspended. Confirm your identity",
    "Netflix payment declined. Update billing information",
    "http://apple-id-verify-account.com/login",
    "http://microsoft-account-recovery.net/reset",
    "http://amazon-security-check.com/update",
    "http://google-account-suspended.com/verify",
    "http://netflix-payment-update.net/billing",
    // Prizes
    "Congratulations! You won $1,000,000. Claim now",
    "You are our lucky winner. Click to claim your prize",
    "FREE iPhone 15 Pro. Limited offer. Click here",
    "You won a $5000 Amazon gift card. Confirm details",
    "WINNER: Claim your lottery prize before it expires",
    // Urgency
    "IMMEDIATE ACTION REQUIRED: Your account at risk",
    "WARNING: Suspicious login attempt detected",
    "Final notice: Your password expired. Reset now",
    "Account will be deleted in 24 hours. Act now",
    "Your data has been compromised. Verify immediately",
    "http://secure-login-update-verify.com",
    "http://account-security-alert.net",
    "http://verify-identity-now.com",
    "http://confirm-account-details.org",
    "http://10.0.0.1/secure/bank",
    "http://172.16.0.50/verify/account",
    "http://payment-update.com/verify",
    "http://account-confirm.net/secure",
    // Tax
    "IRS: You have unclaimed tax refund. Verify SSN",
    "Tax refund of $3,847 pending. Click to claim",
    // Delivery, billing and account pressure
    "Your package delivery failed. Update address now",
    "Payment authorization required. Click immediately",
    "Your subscription expires today. Renew now",
    "Account verification needed within 2 hours",
    "Confirm your email or lose access forever",
    "Security breach detected. Change password now",
    "Your account has been hacked. Reset credentials",
    "Final warning: Verify account or be deleted",
    "Urgent security update required. Download now",
    "Your computer has a virus. Click to remove",
    "Credit card declined. Update payment info",
    "Invoice overdue. Pay immediately to avoid penalty",
    "Package held at customs. Pay fee to release",
    "Your refund is ready. Claim within 48 hours",
    "Account locked due to suspicious activity",
    "Verify your identity to prevent account closure",
    "Update required: Your account is outdated",
    "Confirm your phone number immediately",
    "Your email will be deleted. Click to prevent",
    "Security code needed. Reply with your password",
];

const LEGITIMATE_EXAMPLES: [&str; 65] = [
    // Work
    "Hi team, reminder about meeting tomorrow at 3 PM",
    "Thank you for your purchase. Order shipped successfully",
    "Your project deadline is next Friday",
    "Meeting notes from today are attached",
    "Please review the quarterly report",
    "Lunch meeting scheduled for Thursday",
    "Your subscription has been confirmed",
    "Conference registration successful",
    "Your report was submitted successfully",
    "Appointment reminder: March 15 at 2:30 PM",
    // Personal
    "Hey! Want to grab coffee this weekend",
    "Happy birthday! Hope you have a great day",
    "Looking forward to seeing you next month",
    "Thanks for the help with the project",
    "Can we reschedule our meeting to Monday",
    "Great job on the presentation today",
    "Dinner plans for Saturday evening",
    "Movie night this Friday, are you free",
    "Book club meeting next Tuesday",
    "Yoga class starts at 7 AM tomorrow",
    // Known-good URLs
    "https://github.com",
    "https://google.com",
    "https://amazon.com",
    "https://microsoft.com",
    "https://apple.com",
    "https://facebook.com",
    "https://twitter.com",
    "https://linkedin.com",
    "https://stackoverflow.com",
    "https://reddit.com",
    "https://wikipedia.org",
    "https://youtube.com",
    "https://netflix.com",
    "https://spotify.com",
    "https://github.com/trending",
    // Notifications
    "Your order has been delivered",
    "Flight check-in is now available",
    "Reminder: Dentist appointment tomorrow",
    "Your package will arrive in 2 days",
    "Welcome to our newsletter",
    "Recipe of the week: Pasta carbonara",
    "Weather forecast: Sunny tomorrow",
    "Your gym membership renewed successfully",
    "Library book due next Monday",
    "Prescription ready for pickup",
    // Workplace updates
    "Team building event next month",
    "New company policy effective January",
    "Office will be closed on holidays",
    "Performance review scheduled",
    "Training session on Friday afternoon",
    "Welcome aboard! First day orientation",
    "Expense report approved",
    "Vacation request approved",
    "Congratulations on your promotion",
    "Employee of the month announcement",
    // Informational
    "Blog post published: 10 productivity tips",
    "New feature released in latest update",
    "Server maintenance scheduled for weekend",
    "Survey: Help us improve our service",
    "Community event this Saturday",
    "Webinar recording now available",
    "Product demo scheduled for Tuesday",
    "Monthly newsletter: Industry insights",
    "New course available on platform",
    "Updated terms of service",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthetic_counts() {
        let examples = synthetic(42);
        assert_eq!(examples.len(), 125);
        assert_eq!(class_counts(&examples), (60, 65));
    }

    #[test]
    fn test_synthetic_shuffle_is_seeded() {
        assert_eq!(synthetic(42), synthetic(42));
        assert_ne!(synthetic(42), synthetic(7));
    }

    #[test]
    fn test_csv_roundtrip_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("sample.csv");
        let examples = vec![
            TrainingExample::new("Verify, now: \"urgent\"", Label::Phishing),
            TrainingExample::new("Lunch at noon", Label::Legitimate),
        ];

        write_csv(&path, &examples).unwrap();
        assert_eq!(load_csv(&path).unwrap(), examples);
    }

    #[test]
    fn test_load_csv_ignores_extra_columns_and_case() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(
            file.path(),
            "id,text,label\n1,http://10.0.0.1/login,PHISHING\n2,see you soon,Legitimate\n",
        )
        .unwrap();

        let examples = load_csv(file.path()).unwrap();
        assert_eq!(examples.len(), 2);
        assert_eq!(examples[0].label, Label::Phishing);
        assert_eq!(examples[1].label, Label::Legitimate);
    }

    #[test]
    fn test_load_csv_rejects_unknown_label() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "text,label\nhello,spam\n").unwrap();

        match load_csv(file.path()) {
            Err(PhishError::Dataset(message)) => assert!(message.contains("line 2")),
            other => panic!("expected dataset error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_csv_rejects_empty_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "text,label\n").unwrap();
        assert!(matches!(load_csv(file.path()), Err(PhishError::Dataset(_))));
    }

    #[test]
    fn test_load_or_synthesize_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let config = TrainingConfig {
            dataset_path: dir.path().join("missing.csv").display().to_string(),
            sample_path: dir.path().join("sample.csv").display().to_string(),
            ..Default::default()
        };

        let dataset = load_or_synthesize(&config).unwrap();
        assert_eq!(dataset.origin, DatasetOrigin::Synthetic);
        assert_eq!(dataset.class_counts(), (60, 65));
        assert_eq!(load_csv(&config.sample_path).unwrap(), dataset.examples);
    }

    #[test]
    fn test_load_or_synthesize_prefers_real_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("phishing_data.csv");
        std::fs::write(&path, "text,label\nverify now,phishing\nhello,legitimate\n").unwrap();
        let config = TrainingConfig {
            dataset_path: path.display().to_string(),
            sample_path: dir.path().join("sample.csv").display().to_string(),
            ..Default::default()
        };

        let dataset = load_or_synthesize(&config).unwrap();
        assert_eq!(dataset.origin, DatasetOrigin::File(path));
        assert_eq!(dataset.examples.len(), 2);
        assert!(!dir.path().join("sample.csv").exists());
    }
}
