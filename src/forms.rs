//! Edit/create dialog glue: submit-button rule and the single POST per submission.

use serde_json::{Map, Value};

use crate::api::FormApi;
use crate::errors::AppError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    pub name: String,
    pub value: String,
    /// Value the dialog was pre-filled with; `None` for create dialogs.
    pub original: Option<String>,
    pub required: bool,
}

impl FormField {
    pub fn is_changed(&self) -> bool {
        self.original.as_deref() != Some(self.value.as_str())
    }
}

/// A field the page must patch after a successful submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldChange {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone)]
pub struct EditForm {
    url: String,
    fields: Vec<FormField>,
}

impl EditForm {
    /// Dialog editing an existing entity; fields are pre-filled with `original`.
    pub fn edit(url: impl Into<String>, fields: &[(&str, &str)]) -> Self {
        Self {
            url: url.into(),
            fields: fields
                .iter()
                .map(|(name, original)| FormField {
                    name: name.to_string(),
                    value: original.to_string(),
                    original: Some(original.to_string()),
                    required: true,
                })
                .collect(),
        }
    }

    /// Dialog creating a new entity; every field starts empty.
    pub fn create(url: impl Into<String>, names: &[&str]) -> Self {
        Self {
            url: url.into(),
            fields: names
                .iter()
                .map(|name| FormField {
                    name: name.to_string(),
                    value: String::new(),
                    original: None,
                    required: true,
                })
                .collect(),
        }
    }

    /// Mark a field optional (it may be left empty).
    pub fn optional(mut self, name: &str) -> Self {
        if let Some(field) = self.fields.iter_mut().find(|f| f.name == name) {
            field.required = false;
        }
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    pub fn value(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.value.as_str())
    }

    /// Returns `false` for an unknown field.
    pub fn set(&mut self, name: &str, value: &str) -> bool {
        match self.fields.iter_mut().find(|f| f.name == name) {
            Some(field) => {
                field.value = value.to_string();
                true
            }
            None => false,
        }
    }

    /// Required fields are filled and, when editing, something actually changed.
    pub fn submit_enabled(&self) -> bool {
        let filled = self
            .fields
            .iter()
            .all(|f| !f.required || !f.value.is_empty());
        filled && self.fields.iter().any(FormField::is_changed)
    }

    pub fn body(&self) -> Value {
        let map: Map<String, Value> = self
            .fields
            .iter()
            .map(|f| (f.name.clone(), Value::String(f.value.clone())))
            .collect();
        Value::Object(map)
    }

    /// Send the form. On success the changed fields are returned and become the
    /// new originals; on failure nothing changes.
    pub async fn submit<A: FormApi + ?Sized>(
        &mut self,
        api: &A,
    ) -> Result<(Vec<FieldChange>, Map<String, Value>), AppError> {
        if !self.submit_enabled() {
            return Err(AppError::Application(
                "Fill in every required field before submitting.".to_string(),
            ));
        }

        let data = api.submit_form(&self.url, &self.body()).await?;

        let changes: Vec<FieldChange> = self
            .fields
            .iter()
            .filter(|f| f.is_changed())
            .map(|f| FieldChange {
                name: f.name.clone(),
                value: f.value.clone(),
            })
            .collect();

        for field in &mut self.fields {
            field.original = Some(field.value.clone());
        }

        tracing::info!(url = %self.url, changed = changes.len(), "form submitted");
        Ok((changes, data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingApi {
        calls: Mutex<Vec<(String, Value)>>,
        fail_with: Option<String>,
    }

    #[async_trait]
    impl FormApi for RecordingApi {
        async fn submit_form(&self, url: &str, body: &Value) -> Result<Map<String, Value>, AppError> {
            self.calls.lock().unwrap().push((url.to_string(), body.clone()));
            match &self.fail_with {
                Some(msg) => Err(AppError::Application(msg.clone())),
                None => Ok(Map::new()),
            }
        }
    }

    fn project_form() -> EditForm {
        EditForm::edit(
            "/projects/3/edit",
            &[("title", "Engine"), ("description", "Difference engine")],
        )
    }

    #[test]
    fn test_unchanged_edit_form_is_disabled() {
        let mut form = project_form();
        assert!(!form.submit_enabled());

        form.set("title", "Analytical Engine");
        assert!(form.submit_enabled());

        form.set("description", "");
        assert!(!form.submit_enabled(), "required field emptied");

        form.set("description", "Difference engine");
        form.set("title", "Engine");
        assert!(!form.submit_enabled(), "back to the original values");
    }

    #[test]
    fn test_create_form_requires_all_fields() {
        let mut form = EditForm::create("/projects/create", &["title", "description"]);
        assert!(!form.submit_enabled());
        form.set("title", "New");
        assert!(!form.submit_enabled());
        form.set("description", "Something");
        assert!(form.submit_enabled());
    }

    #[test]
    fn test_optional_field_may_be_empty() {
        let mut form = EditForm::create("/issues/create", &["title", "description"])
            .optional("description");
        form.set("title", "Bug");
        assert!(form.submit_enabled());
    }

    #[tokio::test]
    async fn test_submit_sends_one_request_and_returns_changes() {
        let api = RecordingApi::default();
        let mut form = project_form();
        form.set("title", "Analytical Engine");

        let (changes, _) = form.submit(&api).await.unwrap();
        assert_eq!(
            changes,
            vec![FieldChange {
                name: "title".into(),
                value: "Analytical Engine".into()
            }]
        );

        let calls = api.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "/projects/3/edit");
        assert_eq!(calls[0].1["title"], "Analytical Engine");
        assert_eq!(calls[0].1["description"], "Difference engine");
        drop(calls);

        assert!(!form.submit_enabled(), "submitted values become the originals");
    }

    #[tokio::test]
    async fn test_failed_submit_keeps_state() {
        let api = RecordingApi {
            fail_with: Some("A project with this title already exists.".into()),
            ..Default::default()
        };
        let mut form = project_form();
        form.set("title", "Taken");

        let err = form.submit(&api).await.unwrap_err();
        assert_eq!(
            err.application_message(),
            Some("A project with this title already exists.")
        );
        assert!(form.submit_enabled(), "originals untouched");
        assert_eq!(form.value("title"), Some("Taken"));
    }
}
