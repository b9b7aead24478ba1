// File: src/client/core.rs
use crate::client::dto::{MealRow, SchoolRow, TimetableRow, extract_rows, meal_menu_from_rows};
use crate::client::error::FetchError;
use crate::client::middleware::{SetHeaderLayer, SetHeaderService};
use crate::config::Config;
use crate::dates::format_ymd;
use crate::model::{MealMenu, School, TimetablePeriod};

use chrono::NaiveDate;
use http::{Request, Uri};
use http_body_util::BodyExt;
use hyper_rustls::HttpsConnectorBuilder;
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;
use serde::de::DeserializeOwned;
use tower::{ServiceBuilder, ServiceExt};
use url::Url;

pub const SCHOOL_RESOURCE: &str = "schoolInfo";
pub const MEAL_RESOURCE: &str = "mealServiceDietInfo";

const SEARCH_PAGE_SIZE: &str = "3";
const PAGE_SIZE: &str = "30";

type HttpsClient = Client<hyper_rustls::HttpsConnector<HttpConnector>, String>;
type Transport = SetHeaderService<SetHeaderService<HttpsClient>>;

/// Read-only client for the school directory, meal and timetable resources.
#[derive(Clone, Debug)]
pub struct NeisClient {
    base_url: Url,
    api_key: String,
    transport: Transport,
}

impl NeisClient {
    pub fn new(base_url: &str, api_key: &str) -> Result<Self, FetchError> {
        // `Url::join` replaces the last segment unless the base ends with '/'.
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{}/", base_url)
        };
        let base_url = Url::parse(&normalized)
            .map_err(|e| FetchError::network(format!("invalid base URL '{}': {}", normalized, e)))?;

        let mut root_store = rustls::RootCertStore::empty();
        let result = rustls_native_certs::load_native_certs();
        root_store.add_parsable_certificates(result.certs);
        if root_store.is_empty() {
            log::warn!("No system certificates found; HTTPS requests will fail");
        }
        let tls_config = rustls::ClientConfig::builder()
            .with_root_certificates(root_store)
            .with_no_client_auth();

        let https_connector = HttpsConnectorBuilder::new()
            .with_tls_config(tls_config)
            .https_or_http()
            .enable_http1()
            .build();

        let http_client: HttpsClient = Client::builder(TokioExecutor::new()).build(https_connector);
        let user_agent = format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        let transport = ServiceBuilder::new()
            .layer(SetHeaderLayer::user_agent(&user_agent))
            .layer(SetHeaderLayer::accept_json())
            .service(http_client);

        Ok(Self {
            base_url,
            api_key: api_key.to_string(),
            transport,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, FetchError> {
        Self::new(&config.base_url, &config.api_key)
    }

    fn endpoint(&self, resource: &str, params: &[(&str, &str)]) -> Result<Uri, FetchError> {
        let mut url = self
            .base_url
            .join(resource)
            .map_err(|e| FetchError::network(format!("invalid resource '{}': {}", resource, e)))?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("KEY", &self.api_key)
                .append_pair("Type", "json")
                .append_pair("pIndex", "1");
            for (key, value) in params {
                query.append_pair(key, value);
            }
        }
        url.as_str()
            .parse::<Uri>()
            .map_err(|e| FetchError::network(format!("invalid request URI: {}", e)))
    }

    async fn get_rows<T: DeserializeOwned>(
        &self,
        resource: &str,
        params: &[(&str, &str)],
    ) -> Result<Vec<T>, FetchError> {
        let uri = self.endpoint(resource, params)?;
        log::debug!("GET {}{}", self.base_url, resource);

        let request = Request::get(uri)
            .body(String::new())
            .map_err(|e| FetchError::network(e.to_string()))?;

        let response = self
            .transport
            .clone()
            .oneshot(request)
            .await
            .map_err(|e| FetchError::network(format!("{} request failed: {}", resource, e)))?;

        let status = response.status();
        let body = response
            .into_body()
            .collect()
            .await
            .map_err(|e| FetchError::network(format!("{} body read failed: {}", resource, e)))?
            .to_bytes();

        if !status.is_success() {
            return Err(FetchError::network(format!(
                "{} returned HTTP {}",
                resource, status
            )));
        }

        extract_rows(&body, resource)
    }

    /// Looks a school up by name and returns the first of up to three
    /// candidates.
    pub async fn search_school(&self, name: &str) -> Result<School, FetchError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(FetchError::NotFound);
        }

        let rows: Vec<SchoolRow> = self
            .get_rows(
                SCHOOL_RESOURCE,
                &[("pSize", SEARCH_PAGE_SIZE), ("SCHUL_NM", name)],
            )
            .await?;

        let school = rows
            .into_iter()
            .next()
            .map(SchoolRow::into_domain)
            .ok_or(FetchError::NotFound)?;
        log::info!(
            "Resolved '{}' to {} ({:?}, {}/{})",
            name,
            school.school_name,
            school.school_type,
            school.org_code,
            school.school_code
        );
        Ok(school)
    }

    /// Meals served on `date`. Without a configured school this returns an
    /// empty menu and performs no request.
    pub async fn fetch_meal_list(
        &self,
        config: &Config,
        date: NaiveDate,
    ) -> Result<MealMenu, FetchError> {
        let school = match config.school() {
            Ok(s) => s,
            Err(e) => {
                log::debug!("Skipping meal fetch: {}", e);
                return Ok(MealMenu::default());
            }
        };

        let ymd = format_ymd(date);
        let rows: Vec<MealRow> = self
            .get_rows(
                MEAL_RESOURCE,
                &[
                    ("pSize", PAGE_SIZE),
                    ("ATPT_OFCDC_SC_CODE", school.org_code.as_str()),
                    ("SD_SCHUL_CODE", school.school_code.as_str()),
                    ("MLSV_FROM_YMD", ymd.as_str()),
                    ("MLSV_TO_YMD", ymd.as_str()),
                ],
            )
            .await?;

        Ok(meal_menu_from_rows(rows))
    }

    /// Periods for the configured grade/class on `date`, in response order.
    /// Without a configured school, or for a school kind that has no
    /// timetable resource, this returns an empty list and performs no request.
    pub async fn fetch_timetable(
        &self,
        config: &Config,
        date: NaiveDate,
    ) -> Result<Vec<TimetablePeriod>, FetchError> {
        let school = match config.school() {
            Ok(s) => s,
            Err(e) => {
                log::debug!("Skipping timetable fetch: {}", e);
                return Ok(Vec::new());
            }
        };
        let Some(resource) = school.school_type.timetable_resource() else {
            log::warn!(
                "No timetable resource for {} ({:?})",
                school.school_name,
                school.school_type
            );
            return Ok(Vec::new());
        };

        let ymd = format_ymd(date);
        let grade = config.grade.max(1).to_string();
        let class_number = config.class_number.max(1).to_string();

        let mut params: Vec<(&str, &str)> = vec![
            ("pSize", PAGE_SIZE),
            ("ATPT_OFCDC_SC_CODE", school.org_code.as_str()),
            ("SD_SCHUL_CODE", school.school_code.as_str()),
        ];
        if !config.department.is_empty() {
            params.push(("DDDEP_NM", config.department.as_str()));
        }
        params.extend([
            ("GRADE", grade.as_str()),
            ("CLASS_NM", class_number.as_str()),
            ("TI_FROM_YMD", ymd.as_str()),
            ("TI_TO_YMD", ymd.as_str()),
        ]);

        let rows: Vec<TimetableRow> = self.get_rows(resource, &params).await?;
        Ok(rows.into_iter().map(TimetableRow::into_domain).collect())
    }
}
