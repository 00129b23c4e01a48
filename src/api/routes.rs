//! API Routes
//!
//! HTTP endpoint definitions.

use axum::{
    extract::{Extension, Path, State},
    http::{header, HeaderName, StatusCode},
    routing::{delete, get, post},
    Json, Router,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::{hash_password, verify_dummy, verify_password, AuthUser, TokenType};
use crate::domain::{
    daily_expenses, expenses_distribution, Amount, AmountError, ChartData, Transaction,
    TransactionType, UNCATEGORIZED_LABEL,
};
use crate::error::{AppError, DetailResponse, ValidationErrors};
use crate::store::{self, Category, CategoryStore, NewTransaction, TransactionStore, UserStore};

use super::AppState;

const REQUIRED_MESSAGE: &str = "This field is required.";
const BLANK_MESSAGE: &str = "This field may not be blank.";
const MAX_USERNAME_CHARS: usize = 150;
const MIN_PASSWORD_CHARS: usize = 8;
const MAX_CATEGORY_NAME_CHARS: usize = 100;

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATE_FORMAT_MESSAGE: &str =
    "Date has wrong format. Use one of these formats instead: YYYY-MM-DD.";
const INVALID_CATEGORY_MESSAGE: &str = "Invalid category.";
const EXPENSE_NEEDS_CATEGORY_MESSAGE: &str =
    "This field may not be null for expense transactions.";
const USERNAME_TAKEN_MESSAGE: &str = "A user with that username already exists.";

const LOGIN_FAILED_DETAIL: &str = "No active account found with the given credentials";
const REFRESH_FAILED_DETAIL: &str = "Token is invalid or expired";
const RESET_OK_DETAIL: &str = "All data has been successfully reset.";

const JSON_EXPORT_DISPOSITION: &str = "attachment; filename=\"data_export.json\"";
const CSV_EXPORT_DISPOSITION: &str = "attachment; filename=\"data_export.csv\"";

// =========================================================================
// Request/Response types
// =========================================================================

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
}

#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TokenPairResponse {
    pub refresh: String,
    pub access: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    #[serde(default)]
    pub refresh: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AccessResponse {
    pub access: String,
}

#[derive(Debug, Deserialize)]
pub struct CategoryPayload {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CategoryResponse {
    pub id: i64,
    pub name: String,
}

impl From<Category> for CategoryResponse {
    fn from(category: Category) -> Self {
        CategoryResponse {
            id: category.id,
            name: category.name,
        }
    }
}

/// Amount in a request body, accepted as a JSON string or number.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AmountPayload {
    Number(serde_json::Number),
    Text(String),
}

impl AmountPayload {
    /// Parse into a validated Amount. String input is trimmed first.
    fn parse(&self) -> Result<Amount, AmountError> {
        match self {
            AmountPayload::Number(n) => n.to_string().parse(),
            AmountPayload::Text(s) => s.trim().parse(),
        }
    }
}

/// Deserialize a present value (including an explicit null) as Some.
/// Combined with `#[serde(default)]` this tells a missing field apart
/// from `"field": null`.
fn deserialize_explicit<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Create, PUT and PATCH all share this payload. Create and PUT require
/// `amount`, `transaction_type` and `date`; PATCH fills missing fields
/// from the stored row.
#[derive(Debug, Deserialize)]
pub struct TransactionPayload {
    #[serde(default)]
    pub amount: Option<AmountPayload>,
    #[serde(default)]
    pub transaction_type: Option<String>,
    #[serde(default, deserialize_with = "deserialize_explicit")]
    pub category: Option<Option<i64>>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "deserialize_explicit")]
    pub description: Option<Option<String>>,
}

#[derive(Debug, Serialize)]
pub struct TransactionResponse {
    pub id: i64,
    pub amount: Amount,
    pub transaction_type: TransactionType,
    pub category: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_name: Option<String>,
    pub description: Option<String>,
    pub date: NaiveDate,
}

impl From<Transaction> for TransactionResponse {
    fn from(transaction: Transaction) -> Self {
        TransactionResponse {
            id: transaction.id,
            amount: transaction.amount,
            transaction_type: transaction.transaction_type,
            category: transaction.category_id,
            category_name: transaction.category_name,
            description: transaction.description,
            date: transaction.date,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ExportData {
    pub transactions: Vec<TransactionResponse>,
    pub categories: Vec<CategoryResponse>,
}

// =========================================================================
// API Router
// =========================================================================

/// Create the API router. Everything except registration and the token
/// endpoints sits behind the auth middleware.
pub fn create_router(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/categories", get(list_categories).post(create_category))
        .route(
            "/categories/:id",
            get(get_category)
                .put(update_category)
                .patch(update_category)
                .delete(delete_category),
        )
        .route(
            "/transactions",
            get(list_transactions).post(create_transaction),
        )
        .route("/transactions/daily-expenses", get(daily_expenses_report))
        .route(
            "/transactions/expenses-distribution",
            get(expenses_distribution_report),
        )
        .route(
            "/transactions/:id",
            get(get_transaction)
                .put(replace_transaction)
                .patch(update_transaction)
                .delete(delete_transaction),
        )
        .route("/reset", delete(reset_data))
        .route("/export/json", get(export_json))
        .route("/export/csv", get(export_csv))
        .layer(axum::middleware::from_fn_with_state(
            state,
            super::middleware::auth_middleware,
        ));

    Router::new()
        .route("/users", post(create_user))
        .route("/token", post(obtain_token_pair))
        .route("/token/refresh", post(refresh_token))
        .merge(protected)
}

// =========================================================================
// POST /users
// =========================================================================

/// Register a new user
async fn create_user(
    State(state): State<AppState>,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    let mut errors = ValidationErrors::new();

    let username = match request.username.as_deref().map(str::trim) {
        None => {
            errors.add("username", REQUIRED_MESSAGE);
            None
        }
        Some("") => {
            errors.add("username", BLANK_MESSAGE);
            None
        }
        Some(name) if name.chars().count() > MAX_USERNAME_CHARS => {
            errors.add(
                "username",
                format!("Ensure this field has no more than {MAX_USERNAME_CHARS} characters."),
            );
            None
        }
        Some(name) => Some(name.to_string()),
    };

    let password = match request.password.as_deref() {
        None => {
            errors.add("password", REQUIRED_MESSAGE);
            None
        }
        Some("") => {
            errors.add("password", BLANK_MESSAGE);
            None
        }
        Some(password) if password.chars().count() < MIN_PASSWORD_CHARS => {
            errors.add(
                "password",
                format!("Ensure this field has at least {MIN_PASSWORD_CHARS} characters."),
            );
            None
        }
        Some(password) => Some(password.to_string()),
    };

    let users = UserStore::new(state.pool.clone());
    if let Some(name) = &username {
        if users.username_exists(name).await? {
            errors.add("username", USERNAME_TAKEN_MESSAGE);
        }
    }

    errors.into_result()?;

    let (Some(username), Some(password)) = (username, password) else {
        return Err(AppError::Internal(
            "registration fields unset after validation".to_string(),
        ));
    };

    let password_hash = hash_password(&password).map_err(|e| AppError::Internal(e.to_string()))?;
    let user = users.create(&username, &password_hash).await?;

    Ok((
        StatusCode::CREATED,
        Json(UserResponse {
            id: user.id,
            username: user.username,
        }),
    ))
}

// =========================================================================
// Token endpoints
// =========================================================================

/// Issue an access/refresh token pair for valid credentials
async fn obtain_token_pair(
    State(state): State<AppState>,
    Json(request): Json<TokenRequest>,
) -> Result<Json<TokenPairResponse>, AppError> {
    let mut errors = ValidationErrors::new();
    if request.username.is_none() {
        errors.add("username", REQUIRED_MESSAGE);
    }
    if request.password.is_none() {
        errors.add("password", REQUIRED_MESSAGE);
    }
    errors.into_result()?;

    let (Some(username), Some(password)) = (request.username, request.password) else {
        return Err(AppError::Internal(
            "token request fields unset after validation".to_string(),
        ));
    };

    let user = UserStore::new(state.pool.clone())
        .find_by_username(&username)
        .await?;

    let user = match user {
        Some(user) if verify_password(&password, &user.password_hash) => user,
        Some(_) => return Err(AppError::Unauthorized(LOGIN_FAILED_DETAIL)),
        None => {
            // Same work whether or not the username exists.
            verify_dummy(&password);
            return Err(AppError::Unauthorized(LOGIN_FAILED_DETAIL));
        }
    };

    let refresh = state
        .jwt
        .generate_refresh_token(user.id)
        .map_err(|e| AppError::Internal(e.to_string()))?;
    let access = state
        .jwt
        .generate_access_token(user.id)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(TokenPairResponse { refresh, access }))
}

/// Exchange a refresh token for a new access token
async fn refresh_token(
    State(state): State<AppState>,
    Json(request): Json<RefreshRequest>,
) -> Result<Json<AccessResponse>, AppError> {
    let Some(refresh) = request.refresh else {
        return Err(AppError::validation("refresh", REQUIRED_MESSAGE));
    };

    let Ok(claims) = state.jwt.validate_token_of_type(&refresh, TokenType::Refresh) else {
        return Err(AppError::Unauthorized(REFRESH_FAILED_DETAIL));
    };

    // The account must still exist.
    let user = UserStore::new(state.pool.clone())
        .find_by_id(claims.sub)
        .await?;
    if user.is_none() {
        return Err(AppError::Unauthorized(REFRESH_FAILED_DETAIL));
    }

    let access = state
        .jwt
        .generate_access_token(claims.sub)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(AccessResponse { access }))
}

// =========================================================================
// Category endpoints
// =========================================================================

fn validate_category_name(payload: &CategoryPayload) -> Result<String, AppError> {
    let Some(raw) = payload.name.as_deref() else {
        return Err(AppError::validation("name", REQUIRED_MESSAGE));
    };

    let name = raw.trim();
    if name.is_empty() {
        return Err(AppError::validation("name", BLANK_MESSAGE));
    }
    if name.chars().count() > MAX_CATEGORY_NAME_CHARS {
        return Err(AppError::validation(
            "name",
            format!("Ensure this field has no more than {MAX_CATEGORY_NAME_CHARS} characters."),
        ));
    }

    Ok(name.to_string())
}

/// List the caller's categories
async fn list_categories(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<CategoryResponse>>, AppError> {
    let categories = CategoryStore::new(state.pool.clone()).list(user.id).await?;
    Ok(Json(categories.into_iter().map(Into::into).collect()))
}

/// Create a category
async fn create_category(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<CategoryPayload>,
) -> Result<(StatusCode, Json<CategoryResponse>), AppError> {
    let name = validate_category_name(&payload)?;
    let category = CategoryStore::new(state.pool.clone())
        .create(user.id, &name)
        .await?;
    Ok((StatusCode::CREATED, Json(category.into())))
}

/// Get one category
async fn get_category(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<Json<CategoryResponse>, AppError> {
    let category = CategoryStore::new(state.pool.clone())
        .find(user.id, id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(category.into()))
}

/// Rename a category (PUT and PATCH behave identically here)
async fn update_category(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
    Json(payload): Json<CategoryPayload>,
) -> Result<Json<CategoryResponse>, AppError> {
    let name = validate_category_name(&payload)?;
    let category = CategoryStore::new(state.pool.clone())
        .update_name(user.id, id, &name)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(category.into()))
}

/// Delete a category; referencing transactions keep running with a null
/// category
async fn delete_category(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let deleted = CategoryStore::new(state.pool.clone())
        .delete(user.id, id)
        .await?;
    if !deleted {
        return Err(AppError::NotFound);
    }
    Ok(StatusCode::NO_CONTENT)
}

// =========================================================================
// Transaction endpoints
// =========================================================================

/// Validate a transaction payload into a storable field set, collecting
/// field-keyed messages. With `base` set (PATCH), fields the payload
/// leaves out are taken from the stored row; without it every field is
/// required.
async fn validate_transaction(
    state: &AppState,
    user_id: i64,
    payload: &TransactionPayload,
    base: Option<&Transaction>,
) -> Result<NewTransaction, AppError> {
    let mut errors = ValidationErrors::new();

    let amount = match (&payload.amount, base) {
        (Some(raw), _) => match raw.parse() {
            Ok(amount) => Some(amount),
            Err(e) => {
                errors.add("amount", e.to_string());
                None
            }
        },
        (None, Some(existing)) => Some(existing.amount.clone()),
        (None, None) => {
            errors.add("amount", REQUIRED_MESSAGE);
            None
        }
    };

    let transaction_type = match (&payload.transaction_type, base) {
        (Some(raw), _) => match raw.parse::<TransactionType>() {
            Ok(transaction_type) => Some(transaction_type),
            Err(e) => {
                errors.add("transaction_type", e.to_string());
                None
            }
        },
        (None, Some(existing)) => Some(existing.transaction_type),
        (None, None) => {
            errors.add("transaction_type", REQUIRED_MESSAGE);
            None
        }
    };

    let date = match (&payload.date, base) {
        (Some(raw), _) => match NaiveDate::parse_from_str(raw, DATE_FORMAT) {
            Ok(date) => Some(date),
            Err(_) => {
                errors.add("date", DATE_FORMAT_MESSAGE);
                None
            }
        },
        (None, Some(existing)) => Some(existing.date),
        (None, None) => {
            errors.add("date", REQUIRED_MESSAGE);
            None
        }
    };

    let (category_id, category_provided) = match (payload.category, base) {
        (Some(explicit), _) => (explicit, true),
        (None, Some(existing)) => (existing.category_id, false),
        (None, None) => (None, false),
    };

    // Inherited ids were checked when they were written; only a freshly
    // provided id needs the ownership check.
    if category_provided {
        if let Some(id) = category_id {
            let owned = CategoryStore::new(state.pool.clone())
                .exists(user_id, id)
                .await?;
            if !owned {
                errors.add("category", INVALID_CATEGORY_MESSAGE);
            }
        }
    }

    if transaction_type == Some(TransactionType::Expense) && category_id.is_none() {
        errors.add("category", EXPENSE_NEEDS_CATEGORY_MESSAGE);
    }

    let description = match (&payload.description, base) {
        (Some(explicit), _) => explicit.clone(),
        (None, Some(existing)) => existing.description.clone(),
        (None, None) => None,
    };

    errors.into_result()?;

    let (Some(amount), Some(transaction_type), Some(date)) = (amount, transaction_type, date)
    else {
        return Err(AppError::Internal(
            "transaction validation left required fields unset".to_string(),
        ));
    };

    Ok(NewTransaction {
        category_id,
        amount,
        transaction_type,
        date,
        description,
    })
}

/// Shared update path for PUT and PATCH.
async fn apply_transaction_update(
    state: &AppState,
    user_id: i64,
    id: i64,
    payload: &TransactionPayload,
    partial: bool,
) -> Result<TransactionResponse, AppError> {
    let store = TransactionStore::new(state.pool.clone());
    let existing = store.find(user_id, id).await?.ok_or(AppError::NotFound)?;

    let base = if partial { Some(&existing) } else { None };
    let update = validate_transaction(state, user_id, payload, base).await?;

    let updated = store
        .update(user_id, id, &update)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(updated.into())
}

/// List the caller's transactions, newest first
async fn list_transactions(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<TransactionResponse>>, AppError> {
    let transactions = TransactionStore::new(state.pool.clone())
        .list(user.id)
        .await?;
    Ok(Json(transactions.into_iter().map(Into::into).collect()))
}

/// Create a transaction
async fn create_transaction(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<TransactionPayload>,
) -> Result<(StatusCode, Json<TransactionResponse>), AppError> {
    let new = validate_transaction(&state, user.id, &payload, None).await?;
    let transaction = TransactionStore::new(state.pool.clone())
        .create(user.id, &new)
        .await?;
    Ok((StatusCode::CREATED, Json(transaction.into())))
}

/// Get one transaction
async fn get_transaction(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<Json<TransactionResponse>, AppError> {
    let transaction = TransactionStore::new(state.pool.clone())
        .find(user.id, id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(transaction.into()))
}

/// Replace a transaction; the full payload is required
async fn replace_transaction(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
    Json(payload): Json<TransactionPayload>,
) -> Result<Json<TransactionResponse>, AppError> {
    let updated = apply_transaction_update(&state, user.id, id, &payload, false).await?;
    Ok(Json(updated))
}

/// Update a transaction; missing fields keep their stored values
async fn update_transaction(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
    Json(payload): Json<TransactionPayload>,
) -> Result<Json<TransactionResponse>, AppError> {
    let updated = apply_transaction_update(&state, user.id, id, &payload, true).await?;
    Ok(Json(updated))
}

/// Delete a transaction
async fn delete_transaction(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let deleted = TransactionStore::new(state.pool.clone())
        .delete(user.id, id)
        .await?;
    if !deleted {
        return Err(AppError::NotFound);
    }
    Ok(StatusCode::NO_CONTENT)
}

// =========================================================================
// Report endpoints
// =========================================================================

/// Expense totals per day over the last 30 days
async fn daily_expenses_report(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<ChartData>, AppError> {
    let transactions = TransactionStore::new(state.pool.clone())
        .list_by_id(user.id)
        .await?;
    let today = Utc::now().date_naive();
    Ok(Json(daily_expenses(today, &transactions)))
}

/// Expense totals per category
async fn expenses_distribution_report(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<ChartData>, AppError> {
    let transactions = TransactionStore::new(state.pool.clone())
        .list_by_id(user.id)
        .await?;
    Ok(Json(expenses_distribution(&transactions)))
}

// =========================================================================
// DELETE /reset
// =========================================================================

/// Delete all of the caller's transactions and categories
async fn reset_data(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<DetailResponse>, AppError> {
    store::reset_user_data(&state.pool, user.id)
        .await
        .map_err(AppError::ResetFailed)?;
    Ok(Json(DetailResponse::new(RESET_OK_DETAIL)))
}

// =========================================================================
// Export endpoints
// =========================================================================

/// Export all data as a downloadable JSON document
async fn export_json(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<([(HeaderName, &'static str); 1], Json<ExportData>), AppError> {
    let transactions = TransactionStore::new(state.pool.clone())
        .list(user.id)
        .await?;
    let categories = CategoryStore::new(state.pool.clone()).list(user.id).await?;

    let body = ExportData {
        transactions: transactions.into_iter().map(Into::into).collect(),
        categories: categories.into_iter().map(Into::into).collect(),
    };

    Ok((
        [(header::CONTENT_DISPOSITION, JSON_EXPORT_DISPOSITION)],
        Json(body),
    ))
}

/// Export all data as a downloadable CSV document
async fn export_csv(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<([(HeaderName, &'static str); 2], Vec<u8>), AppError> {
    let transactions = TransactionStore::new(state.pool.clone())
        .list(user.id)
        .await?;
    let categories = CategoryStore::new(state.pool.clone()).list(user.id).await?;

    let body = build_csv_export(&categories, &transactions)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv"),
            (header::CONTENT_DISPOSITION, CSV_EXPORT_DISPOSITION),
        ],
        body,
    ))
}

/// Build the CSV export document: a categories block, a blank row, then
/// a transactions block. Rows are ragged, so the writer is flexible.
fn build_csv_export(
    categories: &[Category],
    transactions: &[Transaction],
) -> csv::Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(Vec::new());

    writer.write_record(["Categories"])?;
    writer.write_record(["ID", "Name"])?;
    for category in categories {
        writer.write_record([category.id.to_string(), category.name.clone()])?;
    }

    writer.write_record(std::iter::empty::<&str>())?;

    writer.write_record(["Transactions"])?;
    writer.write_record(["ID", "Amount", "Type", "Category", "Description", "Date"])?;
    for transaction in transactions {
        writer.write_record([
            transaction.id.to_string(),
            transaction.amount.to_string(),
            transaction.transaction_type.label().to_string(),
            transaction
                .category_name
                .clone()
                .unwrap_or_else(|| UNCATEGORIZED_LABEL.to_string()),
            transaction.description.clone().unwrap_or_default(),
            transaction.date.to_string(),
        ])?;
    }

    writer.into_inner().map_err(|e| {
        csv::Error::from(std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_payload_defaults() {
        let payload: TransactionPayload = serde_json::from_str("{}").unwrap();
        assert!(payload.amount.is_none());
        assert!(payload.transaction_type.is_none());
        assert_eq!(payload.category, None);
        assert!(payload.date.is_none());
        assert_eq!(payload.description, None);
    }

    #[test]
    fn test_transaction_payload_amount_accepts_number_and_string() {
        let payload: TransactionPayload = serde_json::from_str(r#"{"amount": 12.5}"#).unwrap();
        let amount = payload.amount.unwrap().parse().unwrap();
        assert_eq!(amount.to_string(), "12.50");

        let payload: TransactionPayload = serde_json::from_str(r#"{"amount": "7"}"#).unwrap();
        let amount = payload.amount.unwrap().parse().unwrap();
        assert_eq!(amount.to_string(), "7.00");
    }

    #[test]
    fn test_transaction_payload_tells_null_from_absent() {
        let absent: TransactionPayload = serde_json::from_str("{}").unwrap();
        assert_eq!(absent.category, None);

        let null: TransactionPayload = serde_json::from_str(r#"{"category": null}"#).unwrap();
        assert_eq!(null.category, Some(None));

        let set: TransactionPayload = serde_json::from_str(r#"{"category": 3}"#).unwrap();
        assert_eq!(set.category, Some(Some(3)));

        let described: TransactionPayload =
            serde_json::from_str(r#"{"description": "Groceries"}"#).unwrap();
        assert_eq!(described.description, Some(Some("Groceries".to_string())));

        let cleared: TransactionPayload =
            serde_json::from_str(r#"{"description": null}"#).unwrap();
        assert_eq!(cleared.description, Some(None));
    }

    #[test]
    fn test_transaction_response_omits_missing_category_name() {
        let response = TransactionResponse {
            id: 1,
            amount: "5".parse().unwrap(),
            transaction_type: TransactionType::Income,
            category: None,
            category_name: None,
            description: None,
            date: "2024-01-01".parse().unwrap(),
        };

        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("category_name").is_none());
        assert_eq!(json["category"], serde_json::Value::Null);
        assert_eq!(json["amount"], "5.00");
        assert_eq!(json["transaction_type"], "income");
        assert_eq!(json["date"], "2024-01-01");
    }

    #[test]
    fn test_transaction_response_includes_category_name_when_present() {
        let response = TransactionResponse {
            id: 2,
            amount: "12.5".parse().unwrap(),
            transaction_type: TransactionType::Expense,
            category: Some(7),
            category_name: Some("Food".to_string()),
            description: Some("Lunch".to_string()),
            date: "2024-02-29".parse().unwrap(),
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["category"], 7);
        assert_eq!(json["category_name"], "Food");
        assert_eq!(json["amount"], "12.50");
    }

    #[test]
    fn test_csv_export_layout() {
        let categories = vec![Category {
            id: 1,
            user_id: 1,
            name: "Food".to_string(),
        }];
        let transactions = vec![Transaction {
            id: 1,
            user_id: 1,
            category_id: Some(1),
            amount: "12.50".parse().unwrap(),
            transaction_type: TransactionType::Expense,
            date: "2024-01-01".parse().unwrap(),
            description: None,
            category_name: Some("Food".to_string()),
        }];

        let bytes = build_csv_export(&categories, &transactions).unwrap();
        let text = String::from_utf8(bytes).unwrap();

        assert_eq!(
            text,
            "Categories\nID,Name\n1,Food\n\nTransactions\nID,Amount,Type,Category,Description,Date\n1,12.50,Expense,Food,,2024-01-01\n"
        );
    }

    #[test]
    fn test_csv_export_uncategorized_and_description() {
        let transactions = vec![Transaction {
            id: 4,
            user_id: 1,
            category_id: None,
            amount: "5".parse().unwrap(),
            transaction_type: TransactionType::Income,
            date: "2024-03-05".parse().unwrap(),
            description: Some("Refund".to_string()),
            category_name: None,
        }];

        let bytes = build_csv_export(&[], &transactions).unwrap();
        let text = String::from_utf8(bytes).unwrap();

        assert!(text.contains("4,5.00,Income,Uncategorized,Refund,2024-03-05\n"));
    }
}
