//! Operator-facing text for an upload result.

use shapecam_ftp::UploadOutcome;

pub fn status_text(outcome: UploadOutcome, size: usize) -> String {
    match outcome {
        UploadOutcome::Success => format!(
            "Picture ({:.2} KiB) was uploaded over FTP",
            size as f64 / 1024.0
        ),
        UploadOutcome::ServerUnreachable => "Failed to connect to the FTP server".to_string(),
        UploadOutcome::ProtocolFailure => "Failed in uploading picture over FTP".to_string(),
    }
}

pub fn exit_code(outcome: UploadOutcome) -> u8 {
    match outcome {
        UploadOutcome::Success => 0,
        UploadOutcome::ServerUnreachable => 2,
        UploadOutcome::ProtocolFailure => 3,
    }
}
