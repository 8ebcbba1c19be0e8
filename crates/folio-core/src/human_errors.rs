// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable errors and notices.
//
// Every technical error is mapped to a plain sentence with a clear suggestion.
// The severity drives how a front end presents it.

use crate::error::FolioError;

/// Severity of a message from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Informational; nothing failed.
    Info,
    /// User must do something (choose other files, fix the config).
    ActionRequired,
    /// Trying again may help.
    Transient,
    /// Retrying the same input will fail the same way.
    Permanent,
}

/// A human-readable message with an actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    /// Whether re-triggering the same action could succeed.
    pub retriable: bool,
    pub severity: Severity,
}

/// Aggregate notice for a batch that did not fit in the working set.
pub fn capacity_notice(cap: usize, skipped: usize) -> HumanError {
    HumanError {
        message: format!("{skipped} image(s) were left out because of the {cap}-image limit."),
        suggestion: "Remove some images or create a second PDF for the rest.".into(),
        retriable: false,
        severity: Severity::Info,
    }
}

/// Notice for an add attempt while the working set is already full.
pub fn capacity_full_notice(cap: usize) -> HumanError {
    HumanError {
        message: format!("You can only add up to {cap} images."),
        suggestion: "Remove an image before adding another one.".into(),
        retriable: false,
        severity: Severity::Info,
    }
}

/// Convert a `FolioError` into a `HumanError`.
pub fn humanize_error(err: &FolioError) -> HumanError {
    match err {
        FolioError::CapacityExceeded { cap, skipped } => capacity_notice(*cap, *skipped),

        FolioError::UnsupportedFile { name, .. } => HumanError {
            message: format!("{name} is not an image."),
            suggestion: "Only JPG, PNG, GIF and other image files can be added.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        FolioError::Decode { name, .. } => HumanError {
            message: format!("Image load failed: {name}"),
            suggestion: "The image may be damaged. Remove it or save it again as JPEG or PNG, then create the PDF again.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        FolioError::Layout(_) => HumanError {
            message: "The image couldn't be fitted onto the page.".into(),
            suggestion: "Try a larger page size or a smaller margin.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        FolioError::Pdf(_) => HumanError {
            message: "The PDF couldn't be created.".into(),
            suggestion: "Try again. If this keeps happening, please report it.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        FolioError::Cancelled => HumanError {
            message: "PDF creation was cancelled.".into(),
            suggestion: "Start again when you're ready.".into(),
            retriable: true,
            severity: Severity::Info,
        },

        FolioError::Task(_) => HumanError {
            message: "Something went wrong while processing the images.".into(),
            suggestion: "Try again.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        FolioError::Config(detail) => HumanError {
            message: "The settings file is not valid.".into(),
            suggestion: format!("Fix the setting and try again. ({detail})"),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        FolioError::Io(io_err) => {
            if io_err.kind() == std::io::ErrorKind::NotFound {
                HumanError {
                    message: "The file couldn't be found.".into(),
                    suggestion: "It may have been moved or deleted. Try choosing the file again.".into(),
                    retriable: false,
                    severity: Severity::ActionRequired,
                }
            } else if io_err.kind() == std::io::ErrorKind::PermissionDenied {
                HumanError {
                    message: "There's no permission to access that file.".into(),
                    suggestion: "Check the file permissions, or choose a different location.".into(),
                    retriable: false,
                    severity: Severity::ActionRequired,
                }
            } else {
                HumanError {
                    message: "There was a problem reading or writing a file.".into(),
                    suggestion: "Try again. If this keeps happening, the disk may be full.".into(),
                    retriable: true,
                    severity: Severity::Transient,
                }
            }
        }

        FolioError::Serialization(_) => HumanError {
            message: "The settings file couldn't be read.".into(),
            suggestion: "Check that it is valid JSON.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },
    }
}
