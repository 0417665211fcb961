use crate::models::requests::FORBIDDEN_KEY_CHARS;
use crate::models::{
    Company, Notification, Opportunity, Professional, SkillLevel, SkillValidation, SkillsCatalog,
    Student, StudentProfile, UserRecord,
};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when interacting with the realtime database
#[derive(Debug, Error)]
pub enum FirebaseError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Unauthorized: database rejected the credentials")]
    Unauthorized,

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("Invalid key in path: {0}")]
    InvalidKey(String),
}

/// Children that may hold the owner of a notification
const NOTIFICATION_OWNER_FIELDS: [&str; 2] = ["user_id", "professional_id"];

/// Collection (top-level node) names in the realtime database
#[derive(Debug, Clone)]
pub struct Collections {
    pub users: String,
    pub students: String,
    pub professionals: String,
    pub companies: String,
    pub skill_validations: String,
    pub opportunities: String,
    pub notifications: String,
    pub skills_catalog: String,
}

impl Default for Collections {
    fn default() -> Self {
        Self {
            users: "users".to_string(),
            students: "students".to_string(),
            professionals: "professionals".to_string(),
            companies: "companies".to_string(),
            skill_validations: "skill_validations".to_string(),
            opportunities: "opportunities".to_string(),
            notifications: "notifications".to_string(),
            skills_catalog: "skills_catalog".to_string(),
        }
    }
}

/// Realtime database REST client
///
/// Every node is addressed as `<database_url>/<path>.json`. Server access
/// is authorized with the database secret passed as the `auth` parameter.
pub struct FirebaseClient {
    database_url: String,
    secret: Option<String>,
    client: Client,
    collections: Collections,
}

impl FirebaseClient {
    /// Create a new realtime database client
    pub fn new(
        database_url: String,
        secret: Option<String>,
        timeout: Duration,
        collections: Collections,
    ) -> Result<Self, FirebaseError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            database_url,
            secret,
            client,
            collections,
        })
    }

    /// Build the REST URL of a node, rejecting keys the database refuses
    fn url(&self, path: &str) -> Result<String, FirebaseError> {
        let mut segments = Vec::new();
        for segment in path.split('/') {
            if segment.trim().is_empty() || segment.contains(FORBIDDEN_KEY_CHARS) {
                return Err(FirebaseError::InvalidKey(path.to_string()));
            }
            segments.push(urlencoding::encode(segment).into_owned());
        }

        Ok(format!(
            "{}/{}.json",
            self.database_url.trim_end_matches('/'),
            segments.join("/")
        ))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.secret {
            Some(secret) => request.query(&[("auth", secret)]),
            None => request,
        }
    }

    async fn fetch(&self, path: &str, params: &[(&str, String)]) -> Result<Value, FirebaseError> {
        let url = self.url(path)?;

        tracing::debug!("Fetching node: {}", path);

        let response = self
            .authorize(self.client.get(&url))
            .query(params)
            .send()
            .await?;

        let response = ensure_success(response, "fetch", path).await?;

        response
            .json()
            .await
            .map_err(|e| FirebaseError::InvalidResponse(format!("Failed to read {}: {}", path, e)))
    }

    /// Read a single node, `None` when it does not exist
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>, FirebaseError> {
        let value = self.fetch(path, &[]).await?;

        if value.is_null() {
            return Ok(None);
        }

        serde_json::from_value(value)
            .map(Some)
            .map_err(|e| FirebaseError::InvalidResponse(format!("Failed to parse {}: {}", path, e)))
    }

    /// Read every child of a collection
    ///
    /// Children that do not parse as `T` are skipped.
    pub async fn list<T: DeserializeOwned>(
        &self,
        collection: &str,
    ) -> Result<Vec<(String, T)>, FirebaseError> {
        let value = self.fetch(collection, &[]).await?;
        Ok(documents(collection, value))
    }

    /// Read the children of a collection whose `child` equals `value`
    pub async fn query_equal<T: DeserializeOwned>(
        &self,
        collection: &str,
        child: &str,
        value: &str,
    ) -> Result<Vec<(String, T)>, FirebaseError> {
        let params = [
            ("orderBy", Value::from(child).to_string()),
            ("equalTo", Value::from(value).to_string()),
        ];

        let value = self.fetch(collection, &params).await?;
        Ok(documents(collection, value))
    }

    /// Write a node, replacing whatever was there
    pub async fn set<T: Serialize + ?Sized>(&self, path: &str, value: &T) -> Result<(), FirebaseError> {
        let url = self.url(path)?;

        let response = self
            .authorize(self.client.put(&url))
            .json(value)
            .send()
            .await?;

        ensure_success(response, "write", path).await?;
        tracing::debug!("Wrote node: {}", path);
        Ok(())
    }

    /// Merge the given children into a node
    pub async fn update<T: Serialize + ?Sized>(&self, path: &str, value: &T) -> Result<(), FirebaseError> {
        let url = self.url(path)?;

        let response = self
            .authorize(self.client.patch(&url))
            .json(value)
            .send()
            .await?;

        ensure_success(response, "update", path).await?;
        tracing::debug!("Updated node: {}", path);
        Ok(())
    }

    /// Delete a node
    pub async fn remove(&self, path: &str) -> Result<(), FirebaseError> {
        let url = self.url(path)?;

        let response = self.authorize(self.client.delete(&url)).send().await?;

        ensure_success(response, "remove", path).await?;
        tracing::debug!("Removed node: {}", path);
        Ok(())
    }

    // Users

    pub async fn get_user(&self, uid: &str) -> Result<Option<UserRecord>, FirebaseError> {
        self.get(&doc_path(&self.collections.users, uid)).await
    }

    pub async fn put_user(&self, uid: &str, record: &UserRecord) -> Result<(), FirebaseError> {
        self.set(&doc_path(&self.collections.users, uid), record).await
    }

    // Students

    pub async fn get_student(&self, uid: &str) -> Result<Option<Student>, FirebaseError> {
        self.get(&doc_path(&self.collections.students, uid)).await
    }

    pub async fn put_student(&self, student: &Student) -> Result<(), FirebaseError> {
        self.set(&doc_path(&self.collections.students, &student.id), student).await
    }

    pub async fn list_students(&self) -> Result<Vec<(String, Student)>, FirebaseError> {
        self.list(&self.collections.students).await
    }

    pub async fn update_student_profile(
        &self,
        uid: &str,
        profile: &StudentProfile,
    ) -> Result<(), FirebaseError> {
        self.update(&doc_path(&self.collections.students, uid), profile).await
    }

    /// Flag the profile as complete on both the student and user records
    pub async fn mark_profile_complete(&self, uid: &str) -> Result<(), FirebaseError> {
        let change = json!({ "profile_complete": true });
        self.update(&doc_path(&self.collections.students, uid), &change).await?;
        self.update(&doc_path(&self.collections.users, uid), &change).await
    }

    /// Record a validated level in the student's skill set
    pub async fn set_validated_skill(
        &self,
        student_id: &str,
        skill_name: &str,
        level: SkillLevel,
    ) -> Result<(), FirebaseError> {
        let path = format!(
            "{}/{}/validated_skills/{}",
            self.collections.students, student_id, skill_name
        );
        self.set(&path, &level).await
    }

    // Professionals

    pub async fn get_professional(&self, uid: &str) -> Result<Option<Professional>, FirebaseError> {
        self.get(&doc_path(&self.collections.professionals, uid)).await
    }

    pub async fn put_professional(&self, professional: &Professional) -> Result<(), FirebaseError> {
        self.set(
            &doc_path(&self.collections.professionals, &professional.id),
            professional,
        )
        .await
    }

    pub async fn list_professionals(&self) -> Result<Vec<(String, Professional)>, FirebaseError> {
        self.list(&self.collections.professionals).await
    }

    /// Bump a professional's validation counter
    ///
    /// Read-then-write; concurrent validations by the same professional may
    /// lose an increment.
    pub async fn increment_validation_count(&self, uid: &str) -> Result<u32, FirebaseError> {
        let path = format!("{}/{}/validation_count", self.collections.professionals, uid);
        let current: u32 = self.get(&path).await?.unwrap_or(0);
        let next = current + 1;

        self.update(
            &doc_path(&self.collections.professionals, uid),
            &json!({ "validation_count": next }),
        )
        .await?;

        Ok(next)
    }

    // Companies

    pub async fn get_company(&self, uid: &str) -> Result<Option<Company>, FirebaseError> {
        self.get(&doc_path(&self.collections.companies, uid)).await
    }

    pub async fn put_company(&self, company: &Company) -> Result<(), FirebaseError> {
        self.set(&doc_path(&self.collections.companies, &company.id), company).await
    }

    // Opportunities

    pub async fn put_opportunity(&self, opportunity: &Opportunity) -> Result<(), FirebaseError> {
        self.set(
            &doc_path(&self.collections.opportunities, &opportunity.id),
            opportunity,
        )
        .await
    }

    pub async fn list_opportunities(&self) -> Result<Vec<Opportunity>, FirebaseError> {
        let opportunities = self.list(&self.collections.opportunities).await?;
        Ok(opportunities.into_iter().map(|(_, o)| o).collect())
    }

    pub async fn opportunities_for_company(
        &self,
        company_id: &str,
    ) -> Result<Vec<Opportunity>, FirebaseError> {
        let opportunities = self
            .query_equal(&self.collections.opportunities, "company_id", company_id)
            .await?;
        Ok(opportunities.into_iter().map(|(_, o)| o).collect())
    }

    // Skill validations

    pub async fn get_validation(&self, id: &str) -> Result<Option<SkillValidation>, FirebaseError> {
        let validation: Option<SkillValidation> =
            self.get(&doc_path(&self.collections.skill_validations, id)).await?;

        Ok(validation.map(|mut v| {
            v.id = id.to_string();
            v
        }))
    }

    pub async fn put_validation(&self, validation: &SkillValidation) -> Result<(), FirebaseError> {
        self.set(
            &doc_path(&self.collections.skill_validations, &validation.id),
            validation,
        )
        .await
    }

    /// Every validation request, with `id` taken from its key
    pub async fn list_validations(&self) -> Result<Vec<SkillValidation>, FirebaseError> {
        let validations = self.list(&self.collections.skill_validations).await?;
        Ok(with_ids(validations))
    }

    pub async fn validations_for_professional(
        &self,
        professional_id: &str,
    ) -> Result<Vec<SkillValidation>, FirebaseError> {
        let validations = self
            .query_equal(
                &self.collections.skill_validations,
                "professional_id",
                professional_id,
            )
            .await?;
        Ok(with_ids(validations))
    }

    pub async fn update_validation(&self, id: &str, changes: &Value) -> Result<(), FirebaseError> {
        self.update(&doc_path(&self.collections.skill_validations, id), changes)
            .await
    }

    pub async fn remove_validation(&self, id: &str) -> Result<(), FirebaseError> {
        self.remove(&doc_path(&self.collections.skill_validations, id)).await
    }

    // Notifications

    pub async fn get_notification(&self, id: &str) -> Result<Option<Notification>, FirebaseError> {
        self.get(&doc_path(&self.collections.notifications, id)).await
    }

    pub async fn put_notification(&self, notification: &Notification) -> Result<(), FirebaseError> {
        self.set(
            &doc_path(&self.collections.notifications, &notification.id),
            notification,
        )
        .await
    }

    /// Notifications owned by a user
    ///
    /// Older records name their owner `professional_id` instead of
    /// `user_id`, so both children are queried and merged by key.
    pub async fn notifications_for_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<Notification>, FirebaseError> {
        let mut notifications: BTreeMap<String, Notification> = BTreeMap::new();

        for owner_field in NOTIFICATION_OWNER_FIELDS {
            let matches = self
                .query_equal(&self.collections.notifications, owner_field, user_id)
                .await?;
            notifications.extend(matches);
        }

        Ok(notifications.into_values().collect())
    }

    pub async fn mark_notification_read(&self, id: &str) -> Result<(), FirebaseError> {
        self.update(
            &doc_path(&self.collections.notifications, id),
            &json!({ "read": true }),
        )
        .await
    }

    // Skills catalog

    pub async fn get_catalog(&self) -> Result<SkillsCatalog, FirebaseError> {
        Ok(self
            .get(&self.collections.skills_catalog)
            .await?
            .unwrap_or_default())
    }

    /// Write the given catalog if the store has none yet
    ///
    /// Returns whether the catalog was written.
    pub async fn seed_catalog_if_empty(&self, catalog: &SkillsCatalog) -> Result<bool, FirebaseError> {
        if !self.get_catalog().await?.is_empty() {
            return Ok(false);
        }

        self.set(&self.collections.skills_catalog, catalog).await?;
        tracing::info!("Initialized skills catalog with {} families", catalog.len());
        Ok(true)
    }
}

fn doc_path(collection: &str, id: &str) -> String {
    format!("{}/{}", collection, id)
}

fn with_ids(validations: Vec<(String, SkillValidation)>) -> Vec<SkillValidation> {
    validations
        .into_iter()
        .map(|(id, mut validation)| {
            validation.id = id;
            validation
        })
        .collect()
}

/// Turn a collection node into `(key, document)` pairs, in key order
fn documents<T: DeserializeOwned>(collection: &str, value: Value) -> Vec<(String, T)> {
    match value {
        Value::Object(map) => map
            .into_iter()
            .filter_map(|(id, doc)| match serde_json::from_value(doc) {
                Ok(parsed) => Some((id, parsed)),
                Err(e) => {
                    tracing::debug!("Skipping malformed document {}/{}: {}", collection, id, e);
                    None
                }
            })
            .collect(),
        Value::Null => Vec::new(),
        other => {
            tracing::debug!("Collection {} is not an object: {}", collection, other);
            Vec::new()
        }
    }
}

async fn ensure_success(response: Response, action: &str, path: &str) -> Result<Response, FirebaseError> {
    let status = response.status();

    if status.is_success() {
        return Ok(response);
    }

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(FirebaseError::Unauthorized);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unable to read body".to_string());
    tracing::error!("Failed to {} {}: {} - {}", action, path, status, body);

    Err(FirebaseError::ApiError(format!(
        "Failed to {} {}: {}",
        action, path, status
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> FirebaseClient {
        FirebaseClient::new(
            "https://studyconnect.firebaseio.test/".to_string(),
            None,
            Duration::from_secs(5),
            Collections::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_url_building() {
        let db = client();
        assert_eq!(
            db.url("students/abc").unwrap(),
            "https://studyconnect.firebaseio.test/students/abc.json"
        );
        assert_eq!(
            db.url("students/abc/validated_skills/data analysis").unwrap(),
            "https://studyconnect.firebaseio.test/students/abc/validated_skills/data%20analysis.json"
        );
    }

    #[test]
    fn test_url_rejects_invalid_keys() {
        let db = client();
        assert!(matches!(db.url("students/a.b"), Err(FirebaseError::InvalidKey(_))));
        assert!(matches!(db.url("students//x"), Err(FirebaseError::InvalidKey(_))));
        assert!(matches!(db.url("notifications/$id"), Err(FirebaseError::InvalidKey(_))));
    }

    #[test]
    fn test_documents_skip_malformed() {
        let value = json!({
            "a": { "email": "a@example.com" },
            "b": 42,
            "c": { "email": "c@example.com", "user_type": "student" }
        });

        let docs: Vec<(String, UserRecord)> = documents("users", value);
        let ids: Vec<&str> = docs.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[test]
    fn test_documents_null_collection() {
        let docs: Vec<(String, UserRecord)> = documents("users", Value::Null);
        assert!(docs.is_empty());
    }
}
