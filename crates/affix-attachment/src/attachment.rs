//! Attachment orchestration
//!
//! An `Attachment` is a short-lived facade over one attachment field of one
//! owner record. It is built for a single operation, borrows the owner for
//! metadata, and keeps no state of its own beyond the file assigned to it.

use crate::error::AttachmentError;
use crate::upload::UploadedFile;
use affix_core::{
    AttachmentField, AttachmentOptions, AttachmentOwner, ConfigurationError, FieldValue,
    PathTemplate, PathVariables, ORIGINAL_STYLE,
};
use affix_processing::{ProcessedFile, ProcessingContext, Processor, ProcessorInput};
use affix_storage::{create_storage, Storage};
use std::collections::HashSet;
use std::sync::Arc;

pub struct Attachment<'a, O: AttachmentOwner> {
    name: String,
    owner: &'a mut O,
    options: Arc<AttachmentOptions>,
    template: PathTemplate,
    storage: Arc<dyn Storage>,
    processor: Option<Arc<dyn Processor>>,
    file: Option<UploadedFile>,
}

impl<'a, O: AttachmentOwner> Attachment<'a, O> {
    /// Build an attachment over an already resolved storage backend
    pub fn new(
        name: impl Into<String>,
        owner: &'a mut O,
        options: Arc<AttachmentOptions>,
        storage: Arc<dyn Storage>,
    ) -> Result<Self, ConfigurationError> {
        options.validate()?;
        let template = options.path_template()?;

        Ok(Self {
            name: name.into(),
            owner,
            options,
            template,
            storage,
            processor: None,
            file: None,
        })
    }

    /// Build an attachment, resolving its storage backend from `options`
    pub async fn from_options(
        name: impl Into<String>,
        owner: &'a mut O,
        options: Arc<AttachmentOptions>,
    ) -> Result<Self, AttachmentError> {
        options.validate()?;
        let storage = create_storage(&options.storage_config()).await?;
        Ok(Self::new(name, owner, options, storage)?)
    }

    /// Derive configured styles with `processor` instead of copying the original
    pub fn with_processor(mut self, processor: Arc<dyn Processor>) -> Self {
        self.processor = Some(processor);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn options(&self) -> &AttachmentOptions {
        &self.options
    }

    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    pub fn owner(&self) -> &O {
        &*self.owner
    }

    /// File assigned since construction and not yet saved
    pub fn file(&self) -> Option<&UploadedFile> {
        self.file.as_ref()
    }

    /// Assign a new source file and record its metadata on the owner.
    ///
    /// Storage is not touched until `save`.
    pub fn assign(&mut self, file: UploadedFile) {
        self.owner.set_attachment_field(
            &self.name,
            AttachmentField::Identifier,
            FieldValue::Text(file.identifier()),
        );
        self.owner.set_attachment_field(
            &self.name,
            AttachmentField::Extension,
            FieldValue::Text(file.extension()),
        );
        self.owner.set_attachment_field(
            &self.name,
            AttachmentField::Size,
            FieldValue::Size(file.size()),
        );

        tracing::debug!(
            attachment = %self.name,
            owner_id = %self.owner.id(),
            size_bytes = file.size(),
            "Attachment file assigned"
        );

        self.file = Some(file);
    }

    /// Whether the owner has a stored upload for this attachment
    pub fn is_present(&self) -> bool {
        self.metadata_text(AttachmentField::Identifier)
            .is_some_and(|identifier| !identifier.is_empty())
    }

    /// Size in bytes the owner recorded for the original upload
    pub fn size(&self) -> Option<u64> {
        self.owner
            .get_attachment_field(&self.name, AttachmentField::Size)
            .and_then(|value| value.as_size())
    }

    /// `original` followed by every configured style
    pub fn styles(&self) -> Vec<&str> {
        self.options.style_names().collect()
    }

    /// Extension used in paths for `style`.
    ///
    /// A style's declared extension wins. Every other style, `original`
    /// included, uses the extension stored on the owner, which is always the
    /// extension of the original upload.
    pub fn extension(&self, style: &str) -> Result<String, ConfigurationError> {
        let declared = self
            .options
            .style(style)?
            .and_then(|options| options.normalized_extension());

        Ok(declared.unwrap_or_else(|| {
            self.metadata_text(AttachmentField::Extension)
                .unwrap_or_default()
        }))
    }

    /// Storage path for `style`, with every template token substituted
    pub fn path(&self, style: &str) -> Result<String, ConfigurationError> {
        let extension = self.extension(style)?;
        let id = self.owner.id();

        Ok(self.template.render(&PathVariables {
            id: &id,
            name: &self.name,
            style,
            extension: &extension,
        }))
    }

    /// Absolute URL for `style`: `{protocol}://{host}{path}`.
    ///
    /// Falls back to `default_url` when nothing is attached and one is configured.
    pub fn url(&self, style: &str) -> Result<String, ConfigurationError> {
        if !self.is_present() {
            if let Some(ref default_url) = self.options.default_url {
                self.options.style(style)?;
                return Ok(default_url.clone());
            }
        }

        Ok(format!(
            "{}://{}{}",
            self.options.protocol,
            self.storage.host(),
            self.path(style)?
        ))
    }

    /// Distinct storage paths of every style, `original` first
    pub fn paths(&self) -> Result<Vec<String>, ConfigurationError> {
        let mut seen = HashSet::new();
        let mut paths = Vec::new();
        for style in self.options.style_names() {
            let path = self.path(style)?;
            if seen.insert(path.clone()) {
                paths.push(path);
            }
        }
        Ok(paths)
    }

    /// Persist the assigned file and every configured style.
    ///
    /// Does nothing when no file is assigned. Styles are derived before
    /// anything is written, so a rejected upload leaves storage untouched.
    /// On success the assigned file is released.
    #[tracing::instrument(skip(self), fields(attachment = %self.name))]
    pub async fn save(&mut self) -> Result<(), AttachmentError> {
        let Some(file) = self.file.as_ref() else {
            tracing::debug!("No file assigned, nothing to save");
            return Ok(());
        };

        let start = std::time::Instant::now();
        let original_path = self.path(ORIGINAL_STYLE)?;
        let derived = self.derive_styles(file, &original_path).await?;

        self.storage.save(file.path(), &original_path).await?;
        for (path, processed) in &derived {
            let source = processed
                .as_ref()
                .map(ProcessedFile::path)
                .unwrap_or_else(|| file.path());
            self.storage.save(source, path).await?;
        }

        tracing::info!(
            owner_id = %self.owner.id(),
            paths = derived.len() + 1,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Attachment saved"
        );

        self.file = None;
        Ok(())
    }

    /// Remove the stored file of every style, one storage call per distinct path
    #[tracing::instrument(skip(self), fields(attachment = %self.name))]
    pub async fn destroy(&mut self) -> Result<(), AttachmentError> {
        let paths = self.paths()?;
        for path in &paths {
            self.storage.destroy(path).await?;
        }

        tracing::info!(
            owner_id = %self.owner.id(),
            paths = paths.len(),
            "Attachment destroyed"
        );

        Ok(())
    }

    /// Target path and processed output for each configured style.
    ///
    /// `None` means the style stores a copy of the original. Styles whose path
    /// coincides with one already covered are skipped.
    async fn derive_styles(
        &self,
        file: &UploadedFile,
        original_path: &str,
    ) -> Result<Vec<(String, Option<ProcessedFile>)>, AttachmentError> {
        let context = ProcessingContext {
            attachment: self.name.clone(),
            owner_id: self.owner.id(),
            original_filename: Some(file.original_filename().to_string()),
        };

        let mut seen = HashSet::from([original_path.to_string()]);
        let mut derived = Vec::with_capacity(self.options.styles.len());

        for (style_name, style) in &self.options.styles {
            let path = self.path(style_name)?;
            if !seen.insert(path.clone()) {
                continue;
            }

            let processed = match self.processor {
                Some(ref processor) => Some(
                    processor
                        .process(ProcessorInput {
                            source: file.path(),
                            style_name: style_name.as_str(),
                            style,
                            context: &context,
                        })
                        .await?,
                ),
                None => None,
            };
            derived.push((path, processed));
        }

        Ok(derived)
    }

    fn metadata_text(&self, field: AttachmentField) -> Option<String> {
        self.owner
            .get_attachment_field(&self.name, field)
            .and_then(|value| value.as_text().map(String::from))
    }
}
