// Family Budget - REST API
//
// Every page is exposed over JSON. Handlers lock the shared store, load the
// page blob, mutate, save, and answer `{success, data, error}`.

use crate::auth::{AuthSession, User};
use crate::error::BudgetError;
use crate::finance::{BudgetRule, BudgetSplit};
use crate::i18n::{translations, Language, LanguageState};
use crate::pages::assistant::{self, AssistantContext, AssistantReply};
use crate::pages::banking::{assess_loan, BankTransaction, Beneficiary, LoanApplication, LoanDecision, NewBeneficiary, OnlineBanking};
use crate::pages::budget_planner::{BudgetPlan, CategoryUtilization};
use crate::pages::clothing::{ClothingBudget, ClothingPurchase, NewClothingPurchase};
use crate::pages::dashboard::DashboardOverview;
use crate::pages::expenses::{CategoryTotal, Expense, ExpenseLedger, MonthTotal, NewExpense};
use crate::pages::family::{ContributionShare, FamilyBudget, FamilyMember, MemberSpend, NewFamilyMember, NewSharedExpense, SharedExpense};
use crate::pages::goals::{Goal, GoalSummary, GoalTracker, NewGoal};
use crate::pages::healthcare::{analyze_scan, search_medicines, HealthExpense, HealthLog, Medicine, NewHealthExpense, ScanAnalysis};
use crate::pages::investments::{round_up_savings, ChitFund, Investment, NewInvestment, Portfolio, PortfolioSummary, RoundUpSummary};
use crate::pages::profile::Profile;
use crate::pages::reminders::{NewReminder, Reminder, ReminderBoard};
use crate::pages::schemes::{eligible, EligibilityQuery, Scheme, SchemeNotifications};
use crate::pages::subscriptions::{NewSubscription, Subscription, SubscriptionList};
use crate::pages::summary::FinancialSummary;
use crate::pages::vault::{generate_password, score_password, NewPasswordEntry, PasswordEntry, PasswordStrength, PasswordVault};
use crate::routes::{resolve, Route};
use crate::storage::{Event, LocalStore, Persisted};
use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Path, Query, Request, State},
    http::{header, request::Parts, StatusCode, Uri},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use chrono::{Datelike, NaiveDate};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

/// Upcoming window used by list endpoints.
const UPCOMING_DAYS: i64 = 30;
const MINI_STATEMENT_LEN: usize = 10;
const ACTIVITY_LEN: usize = 20;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    store: Arc<Mutex<LocalStore>>,
    latency: Duration,
}

impl AppState {
    pub fn new(store: LocalStore, latency: Duration) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
            latency,
        }
    }

    /// Run `f` against the locked store and wrap its value in the envelope.
    fn with_store<T, F>(&self, f: F) -> ApiResult<T>
    where
        F: FnOnce(&LocalStore) -> crate::Result<T>,
    {
        let store = self.lock()?;
        let value = f(&*store)?;
        Ok(Json(ApiResponse::ok(value)))
    }

    fn lock(&self) -> crate::Result<MutexGuard<'_, LocalStore>> {
        self.store
            .lock()
            .map_err(|_| BudgetError::Io(std::io::Error::other("store lock poisoned")))
    }

    /// Stand-in for a remote call. Must not be awaited while holding the lock.
    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

// ============================================================================
// Envelope & errors
// ============================================================================

/// API Response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    fn err(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
        }
    }
}

#[derive(Debug)]
pub struct ApiError(BudgetError);

impl From<BudgetError> for ApiError {
    fn from(err: BudgetError) -> Self {
        ApiError(err)
    }
}

pub fn status_for(err: &BudgetError) -> StatusCode {
    match err {
        BudgetError::Validation(_) | BudgetError::Csv(_) => StatusCode::BAD_REQUEST,
        BudgetError::Auth(_) => StatusCode::UNAUTHORIZED,
        BudgetError::NotFound { .. } => StatusCode::NOT_FOUND,
        BudgetError::InsufficientFunds { .. } | BudgetError::Duplicate { .. } => StatusCode::CONFLICT,
        BudgetError::Storage(_) | BudgetError::Json(_) | BudgetError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        if self.0.is_user_error() {
            warn!(status = status.as_u16(), error = %self.0, "request rejected");
        } else {
            error!(error = %self.0, "request failed");
        }
        (status, Json(ApiResponse::<()>::err(self.0.to_string()))).into_response()
    }
}

type ApiResult<T> = std::result::Result<Json<ApiResponse<T>>, ApiError>;

/// `Json` whose rejections (missing field, wrong type, bad content type)
/// answer 400 in the envelope instead of axum's plain-text 422.
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| malformed("body", rejection.body_text()))?;
        Ok(ApiJson(value))
    }
}

/// `Query` counterpart of `ApiJson`.
pub struct ApiQuery<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| malformed("query", rejection.body_text()))?;
        Ok(ApiQuery(value))
    }
}

fn malformed(field: &str, detail: String) -> ApiError {
    ApiError(BudgetError::invalid("Request", field, detail))
}

// ============================================================================
// Request & response bodies
// ============================================================================

#[derive(Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Deserialize)]
struct SignupRequest {
    name: String,
    email: String,
    password: String,
}

#[derive(Deserialize)]
struct LanguageRequest {
    code: String,
}

#[derive(Serialize)]
struct LanguageResponse {
    code: &'static str,
    name: &'static str,
}

impl From<Language> for LanguageResponse {
    fn from(lang: Language) -> Self {
        Self {
            code: lang.code(),
            name: lang.native_name(),
        }
    }
}

#[derive(Deserialize)]
struct LangQuery {
    lang: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AmountRequest {
    #[serde(deserialize_with = "crate::validation::lenient_amount")]
    amount: f64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct IncomeRequest {
    #[serde(deserialize_with = "crate::validation::lenient_amount")]
    monthly_income: f64,
}

#[derive(Deserialize)]
struct LimitRequest {
    category: String,
    #[serde(deserialize_with = "crate::validation::lenient_amount")]
    limit: f64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CashRequest {
    #[serde(deserialize_with = "crate::validation::lenient_amount")]
    amount: f64,
    #[serde(default)]
    category: String,
    #[serde(default)]
    description: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransferRequest {
    beneficiary_id: String,
    #[serde(deserialize_with = "crate::validation::lenient_amount")]
    amount: f64,
}

#[derive(Deserialize)]
struct PasswordRequest {
    password: String,
}

#[derive(Deserialize)]
struct SearchQuery {
    q: Option<String>,
}

#[derive(Deserialize)]
struct GenerateQuery {
    length: Option<usize>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScanRequest {
    file_name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChitQuery {
    members: u32,
    monthly_contribution: f64,
}

#[derive(Deserialize)]
struct RoundUpQuery {
    base: Option<f64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ActivityQuery {
    limit: Option<usize>,
    entity_type: Option<String>,
    entity_id: Option<String>,
}

#[derive(Deserialize)]
struct AssistantRequest {
    question: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalyticsResponse {
    category_breakdown: Vec<CategoryTotal>,
    monthly_trend: Vec<MonthTotal>,
    daily_average: f64,
    top_categories: Vec<CategoryTotal>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BudgetPlanResponse {
    plan: BudgetPlan,
    allocation: BudgetSplit,
    unallocated: f64,
    utilization: Vec<CategoryUtilization>,
    alerts: Vec<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GoalsResponse {
    goals: Vec<Goal>,
    summary: GoalSummary,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RemindersResponse {
    reminders: Vec<Reminder>,
    upcoming: Vec<Reminder>,
    overdue: Vec<Reminder>,
    active_total: f64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AccountResponse {
    balance: f64,
    total_credits: f64,
    total_debits: f64,
    mini_statement: Vec<BankTransaction>,
    beneficiaries: Vec<Beneficiary>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VaultResponse {
    entries: Vec<PasswordEntry>,
    weak: usize,
    reused_groups: usize,
}

#[derive(Serialize)]
struct GeneratedPassword {
    password: String,
    strength: PasswordStrength,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthResponse {
    expenses: Vec<HealthExpense>,
    annual_total: f64,
    insurance_premiums: f64,
    section_80d_remaining: f64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Renewal {
    subscription: Subscription,
    renews_on: NaiveDate,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SubscriptionsResponse {
    subscriptions: Vec<Subscription>,
    monthly_total: f64,
    yearly_total: f64,
    per_person_cost: f64,
    upcoming_renewals: Vec<Renewal>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ClothingResponse {
    monthly_budget: f64,
    purchases: Vec<ClothingPurchase>,
    spent_this_month: f64,
    remaining: f64,
    over_budget: bool,
    by_category: BTreeMap<String, f64>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InvestmentsResponse {
    investments: Vec<Investment>,
    summary: PortfolioSummary,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ChitResponse {
    fund: ChitFund,
    pot_size: f64,
    duration_months: u32,
    total_contribution: f64,
    payout: f64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FamilyResponse {
    members: Vec<FamilyMember>,
    expenses: Vec<SharedExpense>,
    household_income: f64,
    total_expenses: f64,
    savings: f64,
    savings_rate: f64,
    spend_by_member: Vec<MemberSpend>,
    contribution_share: Vec<ContributionShare>,
}

// ============================================================================
// Auth & language
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// POST /api/auth/login
async fn login(State(state): State<AppState>, ApiJson(req): ApiJson<LoginRequest>) -> ApiResult<User> {
    state.simulate_latency().await;
    state.with_store(|store| AuthSession::restore(store)?.login(store, &req.email, &req.password))
}

/// POST /api/auth/signup
async fn signup(State(state): State<AppState>, ApiJson(req): ApiJson<SignupRequest>) -> ApiResult<User> {
    state.simulate_latency().await;
    state.with_store(|store| AuthSession::restore(store)?.signup(store, &req.name, &req.email, &req.password))
}

/// POST /api/auth/logout
async fn logout(State(state): State<AppState>) -> ApiResult<Option<User>> {
    state.with_store(|store| AuthSession::restore(store)?.logout(store))
}

/// GET /api/auth/me - 401 when nobody is signed in
async fn current_user(State(state): State<AppState>) -> ApiResult<User> {
    state.with_store(|store| AuthSession::restore(store)?.require_user().cloned())
}

/// GET /api/activity?limit=20 - Audit trail, newest first; `entityType` and
/// `entityId` narrow it to one record in insertion order
async fn list_activity(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ActivityQuery>,
) -> ApiResult<Vec<Event>> {
    state.with_store(|store| match (&query.entity_type, &query.entity_id) {
        (Some(kind), Some(id)) => store.events_for_entity(kind, id),
        _ => store.recent_events(query.limit.unwrap_or(ACTIVITY_LEN)),
    })
}

/// GET /api/language
async fn get_language(State(state): State<AppState>) -> ApiResult<LanguageResponse> {
    state.with_store(|store| Ok(LanguageState::load(store)?.current().into()))
}

/// PUT /api/language
async fn set_language(State(state): State<AppState>, ApiJson(req): ApiJson<LanguageRequest>) -> ApiResult<LanguageResponse> {
    state.with_store(|store| {
        let lang = Language::from_code(&req.code)
            .ok_or_else(|| BudgetError::invalid("Language", "code", format!("Unsupported language: {}", req.code)))?;
        LanguageState::load(store)?.set_language(store, lang)?;
        Ok(lang.into())
    })
}

/// GET /api/translations?lang=ta - Every label for a language (defaults to the selected one)
async fn get_translations(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<LangQuery>,
) -> ApiResult<BTreeMap<&'static str, String>> {
    state.with_store(|store| {
        let lang = match query.lang.as_deref().and_then(Language::from_code) {
            Some(lang) => lang,
            None => LanguageState::load(store)?.current(),
        };
        Ok(translations(lang).into_iter().collect())
    })
}

// ============================================================================
// Dashboard, expenses & analytics
// ============================================================================

/// GET /api/dashboard
async fn get_dashboard(State(state): State<AppState>) -> ApiResult<DashboardOverview> {
    state.with_store(|store| {
        Ok(DashboardOverview::build(
            today(),
            &BudgetPlan::load(store)?,
            &ExpenseLedger::load(store)?,
            &GoalTracker::load(store)?,
            &ReminderBoard::load(store)?,
        ))
    })
}

/// GET /api/expenses
async fn list_expenses(State(state): State<AppState>) -> ApiResult<Vec<Expense>> {
    state.with_store(|store| Ok(ExpenseLedger::load(store)?.all().to_vec()))
}

/// POST /api/expenses
async fn add_expense(State(state): State<AppState>, ApiJson(input): ApiJson<NewExpense>) -> ApiResult<Expense> {
    state.with_store(|store| {
        let mut ledger = ExpenseLedger::load(store)?;
        let expense = ledger.add(input)?;
        ledger.save(store)?;
        Ok(expense)
    })
}

/// DELETE /api/expenses/:id
async fn delete_expense(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Expense> {
    state.with_store(|store| {
        let mut ledger = ExpenseLedger::load(store)?;
        let removed = ledger.remove(&id)?;
        ledger.save(store)?;
        Ok(removed)
    })
}

/// POST /api/expenses/import - CSV body; all rows or none
async fn import_expenses(State(state): State<AppState>, body: String) -> ApiResult<usize> {
    state.with_store(|store| {
        let mut ledger = ExpenseLedger::load(store)?;
        let added = ledger.import_csv(body.as_bytes())?;
        ledger.save(store)?;
        Ok(added)
    })
}

/// GET /api/expenses/export
async fn export_expenses(State(state): State<AppState>) -> Result<Response, ApiError> {
    let ledger = ExpenseLedger::load(&*state.lock()?)?;

    let mut buf = Vec::new();
    ledger.export_csv(&mut buf)?;
    Ok(csv_response(buf, "expenses.csv"))
}

/// GET /api/analytics
async fn get_analytics(State(state): State<AppState>) -> ApiResult<AnalyticsResponse> {
    state.with_store(|store| {
        let ledger = ExpenseLedger::load(store)?;
        let now = today();
        Ok(AnalyticsResponse {
            category_breakdown: ledger.category_breakdown(),
            monthly_trend: ledger.monthly_trend(),
            daily_average: ledger.daily_average(now.year(), now.month()),
            top_categories: ledger.top_categories(5),
        })
    })
}

// ============================================================================
// Budget planner
// ============================================================================

fn budget_plan_view(store: &LocalStore, plan: BudgetPlan) -> crate::Result<BudgetPlanResponse> {
    let ledger = ExpenseLedger::load(store)?;
    let now = today();
    Ok(BudgetPlanResponse {
        allocation: plan.allocation(),
        unallocated: plan.unallocated(),
        utilization: plan.utilization(&ledger, now.year(), now.month()),
        alerts: plan.alerts(&ledger, now.year(), now.month()),
        plan,
    })
}

/// GET /api/budget-plan
async fn get_budget_plan(State(state): State<AppState>) -> ApiResult<BudgetPlanResponse> {
    state.with_store(|store| budget_plan_view(store, BudgetPlan::load(store)?))
}

/// PUT /api/budget-plan/income
async fn set_income(State(state): State<AppState>, ApiJson(req): ApiJson<IncomeRequest>) -> ApiResult<BudgetPlanResponse> {
    state.with_store(|store| {
        let mut plan = BudgetPlan::load(store)?;
        plan.set_income(req.monthly_income)?;
        plan.save(store)?;
        budget_plan_view(store, plan)
    })
}

/// PUT /api/budget-plan/rule
async fn set_rule(State(state): State<AppState>, ApiJson(rule): ApiJson<BudgetRule>) -> ApiResult<BudgetPlanResponse> {
    state.with_store(|store| {
        let mut plan = BudgetPlan::load(store)?;
        plan.set_rule(rule)?;
        plan.save(store)?;
        budget_plan_view(store, plan)
    })
}

/// PUT /api/budget-plan/limits
async fn set_limit(State(state): State<AppState>, ApiJson(req): ApiJson<LimitRequest>) -> ApiResult<BudgetPlanResponse> {
    state.with_store(|store| {
        let mut plan = BudgetPlan::load(store)?;
        plan.set_limit(&req.category, req.limit)?;
        plan.save(store)?;
        budget_plan_view(store, plan)
    })
}

/// DELETE /api/budget-plan/limits/:category
async fn remove_limit(State(state): State<AppState>, Path(category): Path<String>) -> ApiResult<BudgetPlanResponse> {
    state.with_store(|store| {
        let mut plan = BudgetPlan::load(store)?;
        plan.remove_limit(&category)?;
        plan.save(store)?;
        budget_plan_view(store, plan)
    })
}

// ============================================================================
// Goals
// ============================================================================

/// GET /api/goals
async fn list_goals(State(state): State<AppState>) -> ApiResult<GoalsResponse> {
    state.with_store(|store| {
        let tracker = GoalTracker::load(store)?;
        Ok(GoalsResponse {
            goals: tracker.all().to_vec(),
            summary: tracker.summary(),
        })
    })
}

/// POST /api/goals
async fn add_goal(State(state): State<AppState>, ApiJson(input): ApiJson<NewGoal>) -> ApiResult<Goal> {
    update_goals(&state, |tracker| tracker.add(input))
}

/// PUT /api/goals/:id/progress
async fn set_goal_progress(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<AmountRequest>,
) -> ApiResult<Goal> {
    update_goals(&state, |tracker| tracker.set_progress(&id, req.amount))
}

/// POST /api/goals/:id/contribute
async fn contribute_goal(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<AmountRequest>,
) -> ApiResult<Goal> {
    update_goals(&state, |tracker| tracker.contribute(&id, req.amount))
}

/// POST /api/goals/:id/pause
async fn pause_goal(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Goal> {
    update_goals(&state, |tracker| tracker.pause(&id))
}

/// POST /api/goals/:id/resume
async fn resume_goal(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Goal> {
    update_goals(&state, |tracker| tracker.resume(&id))
}

/// DELETE /api/goals/:id
async fn delete_goal(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Goal> {
    update_goals(&state, |tracker| tracker.remove(&id))
}

fn update_goals<F>(state: &AppState, f: F) -> ApiResult<Goal>
where
    F: FnOnce(&mut GoalTracker) -> crate::Result<Goal>,
{
    state.with_store(|store| {
        let mut tracker = GoalTracker::load(store)?;
        let goal = f(&mut tracker)?;
        tracker.save(store)?;
        Ok(goal)
    })
}

// ============================================================================
// Reminders
// ============================================================================

/// GET /api/reminders
async fn list_reminders(State(state): State<AppState>) -> ApiResult<RemindersResponse> {
    state.with_store(|store| {
        let board = ReminderBoard::load(store)?;
        let now = today();
        Ok(RemindersResponse {
            upcoming: board.due_within(now, UPCOMING_DAYS).into_iter().cloned().collect(),
            overdue: board.overdue(now).into_iter().cloned().collect(),
            active_total: board.active_total(),
            reminders: board.all().to_vec(),
        })
    })
}

/// POST /api/reminders
async fn add_reminder(State(state): State<AppState>, ApiJson(input): ApiJson<NewReminder>) -> ApiResult<Reminder> {
    update_reminders(&state, |board| board.add(input))
}

/// POST /api/reminders/:id/toggle
async fn toggle_reminder(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Reminder> {
    update_reminders(&state, |board| board.toggle_active(&id))
}

/// POST /api/reminders/:id/paid - Recurring bills roll forward one period
async fn pay_reminder(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Reminder> {
    update_reminders(&state, |board| board.mark_paid(&id))
}

/// DELETE /api/reminders/:id
async fn delete_reminder(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Reminder> {
    update_reminders(&state, |board| board.remove(&id))
}

fn update_reminders<F>(state: &AppState, f: F) -> ApiResult<Reminder>
where
    F: FnOnce(&mut ReminderBoard) -> crate::Result<Reminder>,
{
    state.with_store(|store| {
        let mut board = ReminderBoard::load(store)?;
        let reminder = f(&mut board)?;
        board.save(store)?;
        Ok(reminder)
    })
}

// ============================================================================
// Online banking
// ============================================================================

/// GET /api/banking/account
async fn get_account(State(state): State<AppState>) -> ApiResult<AccountResponse> {
    state.with_store(|store| {
        let banking = OnlineBanking::load(store)?;
        let (total_credits, total_debits) = banking.totals();
        Ok(AccountResponse {
            balance: banking.balance(),
            total_credits,
            total_debits,
            mini_statement: banking.mini_statement(MINI_STATEMENT_LEN).into_iter().cloned().collect(),
            beneficiaries: banking.beneficiaries.clone(),
        })
    })
}

/// POST /api/banking/deposit
async fn deposit(State(state): State<AppState>, ApiJson(req): ApiJson<CashRequest>) -> ApiResult<BankTransaction> {
    update_banking(&state, |bank| bank.deposit(req.amount, &req.category, &req.description, today()))
}

/// POST /api/banking/withdraw
async fn withdraw(State(state): State<AppState>, ApiJson(req): ApiJson<CashRequest>) -> ApiResult<BankTransaction> {
    update_banking(&state, |bank| bank.withdraw(req.amount, &req.category, &req.description, today()))
}

/// POST /api/banking/transfer
async fn transfer(State(state): State<AppState>, ApiJson(req): ApiJson<TransferRequest>) -> ApiResult<BankTransaction> {
    update_banking(&state, |bank| bank.transfer(&req.beneficiary_id, req.amount, today()))
}

/// GET /api/banking/beneficiaries
async fn list_beneficiaries(State(state): State<AppState>) -> ApiResult<Vec<Beneficiary>> {
    state.with_store(|store| Ok(OnlineBanking::load(store)?.beneficiaries))
}

/// POST /api/banking/beneficiaries
async fn add_beneficiary(State(state): State<AppState>, ApiJson(input): ApiJson<NewBeneficiary>) -> ApiResult<Beneficiary> {
    update_banking(&state, |bank| bank.add_beneficiary(input))
}

/// DELETE /api/banking/beneficiaries/:id
async fn delete_beneficiary(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Beneficiary> {
    update_banking(&state, |bank| bank.remove_beneficiary(&id))
}

/// POST /api/banking/loan - Simulated loan desk
async fn apply_loan(ApiJson(app): ApiJson<LoanApplication>) -> ApiResult<LoanDecision> {
    Ok(Json(ApiResponse::ok(assess_loan(&app)?)))
}

fn update_banking<T, F>(state: &AppState, f: F) -> ApiResult<T>
where
    F: FnOnce(&mut OnlineBanking) -> crate::Result<T>,
{
    state.with_store(|store| {
        let mut banking = OnlineBanking::load(store)?;
        let value = f(&mut banking)?;
        banking.save(store)?;
        Ok(value)
    })
}

// ============================================================================
// Password vault
// ============================================================================

/// GET /api/passwords?q= - Listing is always masked
async fn list_passwords(State(state): State<AppState>, ApiQuery(query): ApiQuery<SearchQuery>) -> ApiResult<VaultResponse> {
    state.with_store(|store| {
        let vault = PasswordVault::load(store)?;
        let entries = match query.q.as_deref() {
            Some(q) => vault.search(q).into_iter().map(PasswordEntry::masked).collect(),
            None => vault.masked(),
        };
        Ok(VaultResponse {
            entries,
            weak: vault.weak_entries().len(),
            reused_groups: vault.reused().len(),
        })
    })
}

/// POST /api/passwords
async fn add_password(State(state): State<AppState>, ApiJson(input): ApiJson<NewPasswordEntry>) -> ApiResult<PasswordEntry> {
    update_vault(&state, |vault| vault.add(input))
}

/// PUT /api/passwords/:id
async fn update_password(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<PasswordRequest>,
) -> ApiResult<PasswordEntry> {
    update_vault(&state, |vault| vault.update_password(&id, &req.password))
}

/// DELETE /api/passwords/:id
async fn delete_password(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<PasswordEntry> {
    update_vault(&state, |vault| vault.remove(&id))
}

/// GET /api/passwords/generate?length=16
async fn generate(ApiQuery(query): ApiQuery<GenerateQuery>) -> Json<ApiResponse<GeneratedPassword>> {
    let password = generate_password(&mut rand::rng(), query.length.unwrap_or(16));
    let strength = score_password(&password);
    Json(ApiResponse::ok(GeneratedPassword { password, strength }))
}

fn update_vault<F>(state: &AppState, f: F) -> ApiResult<PasswordEntry>
where
    F: FnOnce(&mut PasswordVault) -> crate::Result<PasswordEntry>,
{
    state.with_store(|store| {
        let mut vault = PasswordVault::load(store)?;
        let entry = f(&mut vault)?;
        vault.save(store)?;
        Ok(entry.masked())
    })
}

// ============================================================================
// Government schemes
// ============================================================================

/// GET /api/schemes?annualIncome=240000&state=Tamil%20Nadu
async fn list_schemes(ApiQuery(query): ApiQuery<EligibilityQuery>) -> ApiResult<Vec<&'static Scheme>> {
    Ok(Json(ApiResponse::ok(eligible(&query)?)))
}

/// GET /api/schemes/notifications
async fn list_notifications(State(state): State<AppState>) -> ApiResult<Vec<&'static Scheme>> {
    state.with_store(|store| Ok(SchemeNotifications::load(store)?.schemes()))
}

/// POST /api/schemes/:id/notify
async fn subscribe_scheme(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<&'static Scheme> {
    state.with_store(|store| {
        let mut notifications = SchemeNotifications::load(store)?;
        let scheme = notifications.subscribe(&id)?;
        notifications.save(store)?;
        Ok(scheme)
    })
}

/// DELETE /api/schemes/:id/notify
async fn unsubscribe_scheme(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<bool> {
    state.with_store(|store| {
        let mut notifications = SchemeNotifications::load(store)?;
        let removed = notifications.unsubscribe(&id);
        notifications.save(store)?;
        Ok(removed)
    })
}

// ============================================================================
// Healthcare
// ============================================================================

/// GET /api/healthcare/medicines?q=
async fn list_medicines(ApiQuery(query): ApiQuery<SearchQuery>) -> Json<ApiResponse<Vec<&'static Medicine>>> {
    Json(ApiResponse::ok(search_medicines(query.q.as_deref().unwrap_or(""))))
}

/// GET /api/healthcare/expenses
async fn list_health_expenses(State(state): State<AppState>) -> ApiResult<HealthResponse> {
    state.with_store(|store| {
        let log = HealthLog::load(store)?;
        let year = today().year();
        Ok(HealthResponse {
            annual_total: log.annual_total(year),
            insurance_premiums: log.insurance_premiums(year),
            section_80d_remaining: log.section_80d_remaining(year),
            expenses: log.all().to_vec(),
        })
    })
}

/// POST /api/healthcare/expenses
async fn add_health_expense(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<NewHealthExpense>,
) -> ApiResult<HealthExpense> {
    update_health(&state, |log| log.add(input))
}

/// DELETE /api/healthcare/expenses/:id
async fn delete_health_expense(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<HealthExpense> {
    update_health(&state, |log| log.remove(&id))
}

/// POST /api/healthcare/scan - Simulated report reading
async fn scan_report(State(state): State<AppState>, ApiJson(req): ApiJson<ScanRequest>) -> ApiResult<ScanAnalysis> {
    state.simulate_latency().await;
    Ok(Json(ApiResponse::ok(analyze_scan(&mut rand::rng(), &req.file_name)?)))
}

fn update_health<F>(state: &AppState, f: F) -> ApiResult<HealthExpense>
where
    F: FnOnce(&mut HealthLog) -> crate::Result<HealthExpense>,
{
    state.with_store(|store| {
        let mut log = HealthLog::load(store)?;
        let expense = f(&mut log)?;
        log.save(store)?;
        Ok(expense)
    })
}

// ============================================================================
// OTT subscriptions
// ============================================================================

/// GET /api/subscriptions
async fn list_subscriptions(State(state): State<AppState>) -> ApiResult<SubscriptionsResponse> {
    state.with_store(|store| {
        let list = SubscriptionList::load(store)?;
        Ok(SubscriptionsResponse {
            monthly_total: list.monthly_total(),
            yearly_total: list.yearly_total(),
            per_person_cost: list.per_person_cost(),
            upcoming_renewals: list
                .upcoming_renewals(today(), UPCOMING_DAYS)
                .into_iter()
                .map(|(s, renews_on)| Renewal {
                    subscription: s.clone(),
                    renews_on,
                })
                .collect(),
            subscriptions: list.all().to_vec(),
        })
    })
}

/// POST /api/subscriptions
async fn add_subscription(State(state): State<AppState>, ApiJson(input): ApiJson<NewSubscription>) -> ApiResult<Subscription> {
    update_subscriptions(&state, |list| list.add(input))
}

/// POST /api/subscriptions/:id/toggle
async fn toggle_subscription(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Subscription> {
    update_subscriptions(&state, |list| list.toggle(&id))
}

/// DELETE /api/subscriptions/:id
async fn delete_subscription(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Subscription> {
    update_subscriptions(&state, |list| list.remove(&id))
}

fn update_subscriptions<F>(state: &AppState, f: F) -> ApiResult<Subscription>
where
    F: FnOnce(&mut SubscriptionList) -> crate::Result<Subscription>,
{
    state.with_store(|store| {
        let mut list = SubscriptionList::load(store)?;
        let sub = f(&mut list)?;
        list.save(store)?;
        Ok(sub)
    })
}

// ============================================================================
// Clothing
// ============================================================================

fn clothing_view(budget: ClothingBudget) -> ClothingResponse {
    let now = today();
    let (y, m) = (now.year(), now.month());
    ClothingResponse {
        monthly_budget: budget.monthly_budget,
        spent_this_month: budget.spent_in_month(y, m),
        remaining: budget.remaining(y, m),
        over_budget: budget.is_over_budget(y, m),
        by_category: budget.by_category(),
        purchases: budget.purchases,
    }
}

/// GET /api/clothing
async fn get_clothing(State(state): State<AppState>) -> ApiResult<ClothingResponse> {
    state.with_store(|store| Ok(clothing_view(ClothingBudget::load(store)?)))
}

/// PUT /api/clothing/budget
async fn set_clothing_budget(State(state): State<AppState>, ApiJson(req): ApiJson<AmountRequest>) -> ApiResult<ClothingResponse> {
    state.with_store(|store| {
        let mut budget = ClothingBudget::load(store)?;
        budget.set_budget(req.amount)?;
        budget.save(store)?;
        Ok(clothing_view(budget))
    })
}

/// POST /api/clothing
async fn add_clothing(State(state): State<AppState>, ApiJson(input): ApiJson<NewClothingPurchase>) -> ApiResult<ClothingPurchase> {
    state.with_store(|store| {
        let mut budget = ClothingBudget::load(store)?;
        let purchase = budget.add(input)?;
        budget.save(store)?;
        Ok(purchase)
    })
}

/// DELETE /api/clothing/:id
async fn delete_clothing(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<ClothingPurchase> {
    state.with_store(|store| {
        let mut budget = ClothingBudget::load(store)?;
        let purchase = budget.remove(&id)?;
        budget.save(store)?;
        Ok(purchase)
    })
}

// ============================================================================
// Investments
// ============================================================================

/// GET /api/investments
async fn list_investments(State(state): State<AppState>) -> ApiResult<InvestmentsResponse> {
    state.with_store(|store| {
        let portfolio = Portfolio::load(store)?;
        Ok(InvestmentsResponse {
            summary: portfolio.portfolio_summary(today()),
            investments: portfolio.all().to_vec(),
        })
    })
}

/// POST /api/investments
async fn add_investment(State(state): State<AppState>, ApiJson(input): ApiJson<NewInvestment>) -> ApiResult<Investment> {
    state.with_store(|store| {
        let mut portfolio = Portfolio::load(store)?;
        let investment = portfolio.add(input)?;
        portfolio.save(store)?;
        Ok(investment)
    })
}

/// DELETE /api/investments/:id
async fn delete_investment(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Investment> {
    state.with_store(|store| {
        let mut portfolio = Portfolio::load(store)?;
        let investment = portfolio.remove(&id)?;
        portfolio.save(store)?;
        Ok(investment)
    })
}

/// GET /api/investments/chit?members=20&monthlyContribution=5000
async fn chit_calculator(ApiQuery(query): ApiQuery<ChitQuery>) -> ApiResult<ChitResponse> {
    let fund = ChitFund::new(query.members, query.monthly_contribution)?;
    Ok(Json(ApiResponse::ok(ChitResponse {
        pot_size: fund.pot_size(),
        duration_months: fund.duration_months(),
        total_contribution: fund.total_contribution(),
        payout: fund.payout(),
        fund,
    })))
}

/// GET /api/investments/round-up?base=10
async fn round_up(State(state): State<AppState>, ApiQuery(query): ApiQuery<RoundUpQuery>) -> ApiResult<RoundUpSummary> {
    state.with_store(|store| Ok(round_up_savings(&ExpenseLedger::load(store)?, query.base.unwrap_or(10.0))))
}

// ============================================================================
// Family
// ============================================================================

fn family_view(family: FamilyBudget) -> FamilyResponse {
    FamilyResponse {
        household_income: family.household_income(),
        total_expenses: family.total_expenses(),
        savings: family.savings(),
        savings_rate: family.savings_rate(),
        spend_by_member: family.spend_by_member(),
        contribution_share: family.contribution_share(),
        members: family.members,
        expenses: family.expenses,
    }
}

/// GET /api/family
async fn get_family(State(state): State<AppState>) -> ApiResult<FamilyResponse> {
    state.with_store(|store| Ok(family_view(FamilyBudget::load(store)?)))
}

/// POST /api/family/members
async fn add_family_member(State(state): State<AppState>, ApiJson(input): ApiJson<NewFamilyMember>) -> ApiResult<FamilyMember> {
    update_family(&state, |family| family.add_member(input))
}

/// DELETE /api/family/members/:id - Their expenses move to the household
async fn delete_family_member(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<FamilyMember> {
    update_family(&state, |family| family.remove_member(&id))
}

/// POST /api/family/expenses
async fn add_family_expense(State(state): State<AppState>, ApiJson(input): ApiJson<NewSharedExpense>) -> ApiResult<SharedExpense> {
    update_family(&state, |family| family.add_expense(input))
}

/// DELETE /api/family/expenses/:id
async fn delete_family_expense(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<SharedExpense> {
    update_family(&state, |family| family.remove_expense(&id))
}

fn update_family<T, F>(state: &AppState, f: F) -> ApiResult<T>
where
    F: FnOnce(&mut FamilyBudget) -> crate::Result<T>,
{
    state.with_store(|store| {
        let mut family = FamilyBudget::load(store)?;
        let value = f(&mut family)?;
        family.save(store)?;
        Ok(value)
    })
}

// ============================================================================
// Profile, assistant & summary
// ============================================================================

/// GET /api/profile
async fn get_profile(State(state): State<AppState>) -> ApiResult<Profile> {
    state.with_store(|store| {
        let session = AuthSession::restore(store)?;
        Profile::load_for(store, session.current_user())
    })
}

/// PUT /api/profile
async fn update_profile(State(state): State<AppState>, ApiJson(next): ApiJson<Profile>) -> ApiResult<Profile> {
    state.with_store(|store| {
        let session = AuthSession::restore(store)?;
        let mut profile = Profile::load_for(store, session.current_user())?;
        profile.update(next)?;
        profile.save(store)?;
        Ok(profile)
    })
}

/// POST /api/assistant - Answers from page data, otherwise a canned tip
async fn ask_assistant(State(state): State<AppState>, ApiJson(req): ApiJson<AssistantRequest>) -> ApiResult<AssistantReply> {
    state.simulate_latency().await;
    state.with_store(|store| {
        let banking = OnlineBanking::load(store)?;
        let ledger = ExpenseLedger::load(store)?;
        let plan = BudgetPlan::load(store)?;
        let goals = GoalTracker::load(store)?;
        let reminders = ReminderBoard::load(store)?;
        let profile = Profile::load(store)?;

        let ctx = AssistantContext {
            today: today(),
            banking: &banking,
            ledger: &ledger,
            plan: &plan,
            goals: &goals,
            reminders: &reminders,
            state: &profile.state,
        };
        Ok(assistant::answer(&mut rand::rng(), &req.question, &ctx))
    })
}

/// GET /api/summary
async fn get_summary(State(state): State<AppState>) -> ApiResult<FinancialSummary> {
    state.with_store(|store| FinancialSummary::from_store(store, today()))
}

/// GET /api/summary.csv
async fn get_summary_csv(State(state): State<AppState>) -> Result<Response, ApiError> {
    let summary = FinancialSummary::from_store(&*state.lock()?, today())?;

    let mut buf = Vec::new();
    summary.write_csv(&mut buf)?;
    Ok(csv_response(buf, &format!("summary-{}.csv", summary.month)))
}

fn csv_response(body: Vec<u8>, file_name: &str) -> Response {
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{}\"", file_name)),
        ],
        body,
    )
        .into_response()
}

// ============================================================================
// Pages
// ============================================================================

const APP_SHELL: &str = include_str!("../web/app.html");

/// Everything outside /api and /static: the shell, a redirect, or 404.
async fn serve_page(uri: Uri) -> Response {
    match resolve(uri.path()) {
        Route::Page(_) | Route::Login | Route::Signup => Html(APP_SHELL).into_response(),
        Route::Redirect(target) => Redirect::permanent(&target).into_response(),
        Route::NotFound => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::<()>::err(format!("no page at {}", uri.path()))),
        )
            .into_response(),
    }
}

// ============================================================================
// Router
// ============================================================================

pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/auth/login", post(login))
        .route("/auth/signup", post(signup))
        .route("/auth/logout", post(logout))
        .route("/auth/me", get(current_user))
        .route("/activity", get(list_activity))
        .route("/language", get(get_language).put(set_language))
        .route("/translations", get(get_translations))
        .route("/dashboard", get(get_dashboard))
        .route("/expenses", get(list_expenses).post(add_expense))
        .route("/expenses/import", post(import_expenses))
        .route("/expenses/export", get(export_expenses))
        .route("/expenses/:id", delete(delete_expense))
        .route("/analytics", get(get_analytics))
        .route("/budget-plan", get(get_budget_plan))
        .route("/budget-plan/income", put(set_income))
        .route("/budget-plan/rule", put(set_rule))
        .route("/budget-plan/limits", put(set_limit))
        .route("/budget-plan/limits/:category", delete(remove_limit))
        .route("/goals", get(list_goals).post(add_goal))
        .route("/goals/:id", delete(delete_goal))
        .route("/goals/:id/progress", put(set_goal_progress))
        .route("/goals/:id/contribute", post(contribute_goal))
        .route("/goals/:id/pause", post(pause_goal))
        .route("/goals/:id/resume", post(resume_goal))
        .route("/reminders", get(list_reminders).post(add_reminder))
        .route("/reminders/:id", delete(delete_reminder))
        .route("/reminders/:id/toggle", post(toggle_reminder))
        .route("/reminders/:id/paid", post(pay_reminder))
        .route("/banking/account", get(get_account))
        .route("/banking/deposit", post(deposit))
        .route("/banking/withdraw", post(withdraw))
        .route("/banking/transfer", post(transfer))
        .route("/banking/beneficiaries", get(list_beneficiaries).post(add_beneficiary))
        .route("/banking/beneficiaries/:id", delete(delete_beneficiary))
        .route("/banking/loan", post(apply_loan))
        .route("/passwords", get(list_passwords).post(add_password))
        .route("/passwords/generate", get(generate))
        .route("/passwords/:id", put(update_password).delete(delete_password))
        .route("/schemes", get(list_schemes))
        .route("/schemes/notifications", get(list_notifications))
        .route("/schemes/:id/notify", post(subscribe_scheme).delete(unsubscribe_scheme))
        .route("/healthcare/medicines", get(list_medicines))
        .route("/healthcare/expenses", get(list_health_expenses).post(add_health_expense))
        .route("/healthcare/expenses/:id", delete(delete_health_expense))
        .route("/healthcare/scan", post(scan_report))
        .route("/subscriptions", get(list_subscriptions).post(add_subscription))
        .route("/subscriptions/:id", delete(delete_subscription))
        .route("/subscriptions/:id/toggle", post(toggle_subscription))
        .route("/clothing", get(get_clothing).post(add_clothing))
        .route("/clothing/budget", put(set_clothing_budget))
        .route("/clothing/:id", delete(delete_clothing))
        .route("/investments", get(list_investments).post(add_investment))
        .route("/investments/chit", get(chit_calculator))
        .route("/investments/round-up", get(round_up))
        .route("/investments/:id", delete(delete_investment))
        .route("/family", get(get_family))
        .route("/family/members", post(add_family_member))
        .route("/family/members/:id", delete(delete_family_member))
        .route("/family/expenses", post(add_family_expense))
        .route("/family/expenses/:id", delete(delete_family_expense))
        .route("/profile", get(get_profile).put(update_profile))
        .route("/assistant", post(ask_assistant))
        .route("/summary", get(get_summary))
        .route("/summary.csv", get(get_summary_csv))
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .nest_service("/static", ServeDir::new("web"))
        .fallback(serve_page)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ValidationError;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_for(&BudgetError::Validation(vec![ValidationError::new("Goal", "title", "x")])),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(status_for(&BudgetError::not_found("goal", "1")), StatusCode::NOT_FOUND);
        assert_eq!(
            status_for(&BudgetError::InsufficientFunds {
                balance: 10.0,
                requested: 20.0
            }),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_for(&BudgetError::Duplicate {
                entity: "beneficiary",
                key: "1".into()
            }),
            StatusCode::CONFLICT
        );
        assert_eq!(status_for(&BudgetError::Auth("nope".into())), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_envelope_shape() {
        let ok = serde_json::to_value(ApiResponse::ok(5)).unwrap();
        assert_eq!(ok, serde_json::json!({"success": true, "data": 5}));

        let err = serde_json::to_value(ApiResponse::<()>::err("boom".into())).unwrap();
        assert_eq!(err, serde_json::json!({"success": false, "error": "boom"}));
    }
}
