//! Submitted admin forms and the field descriptions the form template renders.

use axum::extract::Multipart;
use catalog::CatalogError;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;

use crate::ServerError;

use super::registry::{Inline, Widget, column_label};

/// Formats matching the browser's `date` and `datetime-local` inputs.
pub const DATE_INPUT: &str = "%Y-%m-%d";
pub const DATETIME_INPUT: &str = "%Y-%m-%dT%H:%M";

/// Most rows one inline formset reads, whatever its management field announces.
pub const MAX_INLINE_FORMS: usize = 1000;

/// A file part of a multipart submission.
#[derive(Debug)]
pub struct Upload {
    pub name: String,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Decoded form submission. Keys may repeat (multi-selects).
#[derive(Debug, Default)]
pub struct FormData {
    fields: Vec<(String, String)>,
    files: Vec<Upload>,
}

impl FormData {
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, ServerError> {
        let mut data = FormData::default();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|err| ServerError::Generic(err.body_text()))?
        {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };
            match field.file_name().map(str::to_string) {
                Some(file_name) => {
                    let bytes = field
                        .bytes()
                        .await
                        .map_err(|err| ServerError::Generic(err.body_text()))?;
                    data.files.push(Upload {
                        name,
                        file_name,
                        bytes: bytes.to_vec(),
                    });
                }
                None => {
                    let value = field
                        .text()
                        .await
                        .map_err(|err| ServerError::Generic(err.body_text()))?;
                    data.fields.push((name, value));
                }
            }
        }
        Ok(data)
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.push((name.into(), value.into()));
    }

    /// First value submitted for `name`, or `""`.
    pub fn value(&self, name: &str) -> &str {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map_or("", |(_, value)| value.as_str())
    }

    pub fn values(&self, name: &str) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
            .collect()
    }

    /// Checkboxes are only submitted when ticked.
    pub fn checked(&self, name: &str) -> bool {
        self.fields
            .iter()
            .any(|(key, value)| key == name && value != "off" && value != "false")
    }

    /// The uploaded file for `name`, ignoring an empty file input.
    pub fn file(&self, name: &str) -> Option<&Upload> {
        self.files
            .iter()
            .find(|upload| upload.name == name && !upload.file_name.is_empty())
    }
}

/// Parse an optional integer field; blank is `None`.
pub fn optional_int(data: &FormData, name: &str, label: &str) -> Result<Option<i32>, CatalogError> {
    let raw = data.value(name).trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse()
        .map(Some)
        .map_err(|_| CatalogError::Validation(format!("{label}: enter a whole number")))
}

/// Parse an optional `datetime-local` value (minutes or seconds precision).
pub fn optional_datetime(
    data: &FormData,
    name: &str,
    label: &str,
) -> Result<Option<DateTime<Utc>>, CatalogError> {
    let raw = data.value(name).trim();
    if raw.is_empty() {
        return Ok(None);
    }
    [DATETIME_INPUT, "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| Some(naive.and_utc()))
        .ok_or_else(|| CatalogError::Validation(format!("{label}: enter a valid date and time")))
}

pub fn optional_date(
    data: &FormData,
    name: &str,
    label: &str,
) -> Result<Option<NaiveDate>, CatalogError> {
    let raw = data.value(name).trim();
    if raw.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(raw, DATE_INPUT)
        .map(Some)
        .map_err(|_| CatalogError::Validation(format!("{label}: enter a valid date")))
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Input {
    Text,
    Email,
    Number,
    Textarea,
    Checkbox,
    Select,
    SelectMultiple,
    File,
    Date,
    DateTime,
}

#[derive(Clone, Debug, Serialize)]
pub struct Choice {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

/// One input of an admin form, as the template renders it.
#[derive(Clone, Debug, Serialize)]
pub struct Field {
    pub name: &'static str,
    pub label: String,
    pub input: Input,
    pub value: String,
    pub required: bool,
    pub choices: Vec<Choice>,
    /// Extra CSS class for widget overrides such as `filter_horizontal`.
    pub widget: Option<String>,
}

impl Field {
    pub fn new(name: &'static str, input: Input, data: &FormData) -> Self {
        Field {
            name,
            label: column_label(name),
            input,
            value: data.value(name).to_string(),
            required: false,
            choices: Vec::new(),
            widget: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Attach choices, marking those whose value was submitted.
    pub fn choices<I>(mut self, options: I, data: &FormData) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let selected = data.values(self.name);
        self.choices = options
            .into_iter()
            .map(|(value, label)| Choice {
                selected: selected.contains(&value.as_str()),
                value,
                label,
            })
            .collect();
        self
    }

    pub fn widget(mut self, widget: Option<Widget>) -> Self {
        match widget {
            Some(Widget::FileUpload) => {
                self.input = Input::File;
                self.widget = Some("file_upload".to_string());
            }
            Some(Widget::FilterHorizontal) => {
                self.widget = Some("filter_horizontal".to_string());
            }
            None => {}
        }
        self
    }
}

/// One row of a tabular inline.
#[derive(Clone, Debug, Serialize)]
pub struct InlineRow {
    pub index: usize,
    pub id: String,
    pub users: Vec<Choice>,
    pub review_text: String,
    pub rating: String,
    pub delete: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct InlineFormset {
    pub prefix: &'static str,
    pub verbose_name_plural: &'static str,
    pub rows: Vec<InlineRow>,
    pub total: usize,
}

impl InlineFormset {
    pub fn total_key(inline: &Inline) -> String {
        format!("{}-TOTAL_FORMS", inline.prefix)
    }

    /// Number of rows the form carried, as announced by its management field,
    /// capped at [`MAX_INLINE_FORMS`].
    pub fn submitted_total(inline: &Inline, data: &FormData) -> usize {
        Self::announced_total(inline, data).min(MAX_INLINE_FORMS)
    }

    /// Reject a submission announcing more rows than an inline accepts.
    pub fn validate_total(inline: &Inline, data: &FormData) -> Result<(), CatalogError> {
        if Self::announced_total(inline, data) > MAX_INLINE_FORMS {
            return Err(CatalogError::Validation(format!(
                "{}: submit at most {MAX_INLINE_FORMS} rows",
                inline.verbose_name_plural
            )));
        }
        Ok(())
    }

    fn announced_total(inline: &Inline, data: &FormData) -> usize {
        data.value(&Self::total_key(inline)).trim().parse().unwrap_or(0)
    }
}

/// Name of field `field` in row `index` of an inline, e.g. `reviews-0-rating`.
pub fn inline_key(inline: &Inline, index: usize, field: &str) -> String {
    format!("{}-{index}-{field}", inline.prefix)
}
