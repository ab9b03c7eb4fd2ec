//! Vacation requests and their review

use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;
use validator::Validate;

use crate::client::ApiClient;
use crate::error::{ClientError, ClientResult};
use crate::types::{Collection, Page, Vacation, VacationStatus};

pub const VACATIONS_PATH: &str = "/api/vacations";

#[derive(Debug, Clone, PartialEq, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct VacationForm {
    pub employee: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[validate(length(min = 1, max = 500, message = "Reason must be 1-500 characters"))]
    pub reason: String,
}

#[derive(Serialize)]
struct Rejection<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<&'a str>,
}

#[derive(Debug, Clone, Default)]
pub struct VacationFilter {
    pub employee: Option<Uuid>,
    pub status: Option<VacationStatus>,
}

#[derive(Debug, Clone)]
pub struct VacationService {
    client: ApiClient,
}

impl VacationService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(
        &self,
        filter: &VacationFilter,
        page: u32,
        per_page: u32,
    ) -> ClientResult<Page<Vacation>> {
        let mut query = vec![
            ("page".to_string(), page.max(1).to_string()),
            ("itemsPerPage".to_string(), per_page.max(1).to_string()),
        ];
        if let Some(employee) = filter.employee {
            query.push(("employee".to_string(), employee.to_string()));
        }
        if let Some(status) = filter.status {
            query.push(("status".to_string(), status.as_str().to_string()));
        }

        let collection: Collection<Vacation> = self.client.get_query(VACATIONS_PATH, &query).await?;
        Ok(Page::from_collection(collection, page, per_page))
    }

    pub async fn get(&self, id: Uuid) -> ClientResult<Vacation> {
        self.client.get(&format!("{}/{}", VACATIONS_PATH, id)).await
    }

    /// Submits a request; the server checks the employee's eligibility
    pub async fn create(&self, form: &VacationForm) -> ClientResult<Vacation> {
        form.validate()?;
        if form.end_date < form.start_date {
            return Err(ClientError::Validation {
                message: "End date must not be before start date".to_string(),
                fields: vec![],
            });
        }
        self.client.post(VACATIONS_PATH, form).await
    }

    pub async fn delete(&self, id: Uuid) -> ClientResult<()> {
        self.client.delete(&format!("{}/{}", VACATIONS_PATH, id)).await
    }

    /// Requires `ROLE_ADMIN`
    pub async fn approve(&self, id: Uuid) -> ClientResult<Vacation> {
        self.client
            .post_empty(&format!("{}/{}/approve", VACATIONS_PATH, id))
            .await
    }

    /// Requires `ROLE_ADMIN`
    pub async fn reject(&self, id: Uuid, reason: Option<&str>) -> ClientResult<Vacation> {
        self.client
            .post(&format!("{}/{}/reject", VACATIONS_PATH, id), &Rejection { reason })
            .await
    }
}
