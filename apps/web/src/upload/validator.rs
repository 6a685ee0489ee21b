use thiserror::Error;

const MIB: u64 = 1024 * 1024;

/// Metadata the validator looks at. Contents are never inspected.
#[derive(Debug, Clone, Copy)]
pub struct FileMeta<'a> {
    pub name: &'a str,
    pub size: u64,
    pub content_type: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("Please upload a {allowed} file")]
    Extension { allowed: String },

    #[error("File size must be less than {limit}MB")]
    TooLarge { limit: String },
}

/// Allow-list and size ceiling applied before any network call.
#[derive(Debug, Clone)]
pub struct UploadPolicy {
    allowed_extensions: Vec<String>,
    max_bytes: u64,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self::new(&[".pdf", ".docx"], 10 * MIB)
    }
}

impl UploadPolicy {
    pub fn new(allowed_extensions: &[&str], max_bytes: u64) -> Self {
        Self {
            allowed_extensions: allowed_extensions
                .iter()
                .map(|ext| ext.to_lowercase())
                .collect(),
            max_bytes,
        }
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    pub fn validate(&self, file: &FileMeta<'_>) -> Result<(), Rejection> {
        let accepted = extension(file.name)
            .map(|ext| self.allowed_extensions.iter().any(|a| *a == ext))
            .unwrap_or(false);
        if !accepted {
            return Err(Rejection::Extension {
                allowed: self.allowed_label(),
            });
        }

        if file.size > self.max_bytes {
            return Err(self.too_large());
        }

        Ok(())
    }

    pub fn too_large(&self) -> Rejection {
        let limit = if self.max_bytes % MIB == 0 {
            (self.max_bytes / MIB).to_string()
        } else {
            format!("{:.1}", self.max_bytes as f64 / MIB as f64)
        };
        Rejection::TooLarge { limit }
    }

    /// `[".pdf", ".docx"]` → `"PDF or DOCX"`.
    fn allowed_label(&self) -> String {
        let names: Vec<String> = self
            .allowed_extensions
            .iter()
            .map(|ext| ext.trim_start_matches('.').to_uppercase())
            .collect();
        match names.split_last() {
            None => "supported".to_string(),
            Some((last, [])) => last.clone(),
            Some((last, rest)) => format!("{} or {}", rest.join(", "), last),
        }
    }
}

/// Lower-cased text from the last `.` on; `None` when the name has no dot.
fn extension(name: &str) -> Option<String> {
    name.rfind('.').map(|idx| name[idx..].to_lowercase())
}
