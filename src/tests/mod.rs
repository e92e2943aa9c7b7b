use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::{advance, Instant};

use crate::api::{ApiError, CatalogApi};
use crate::console::{Console, Options};
use crate::flows::{Confirm, DeleteOutcome, EditDialog, OpenOutcome, Submission};
use crate::model::{
    FormField, Product, ProductForm, ProductId, ProductPayload, ValidationError,
};
use crate::output::ListView;
use crate::query::{ListQuery, QueryInputs, SortKey};
use crate::view::View;

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Call {
    List(ListQuery),
    Get(ProductId),
    Create(ProductPayload),
    Update(ProductId, ProductPayload),
    Delete(ProductId),
}

#[derive(Clone, Debug)]
pub(crate) enum Fault {
    Reject { status: u16, message: Option<String> },
    Garbled,
}

impl Fault {
    fn into_error(self) -> ApiError {
        match self {
            Fault::Reject { status, message } => ApiError::Rejected { status, message },
            Fault::Garbled => ApiError::Decode {
                what: "product list",
                url: "http://catalog.test/api/products".to_string(),
                source: serde_json::from_str::<Vec<Product>>("<html>").unwrap_err(),
            },
        }
    }
}

/// In-memory catalog that records every request it receives.
pub(crate) struct FakeCatalog {
    products: Mutex<Vec<Product>>,
    calls: Mutex<Vec<(Call, Instant)>>,
    faults: Mutex<Vec<(&'static str, Fault)>>,
    next_id: AtomicU64,
}

impl FakeCatalog {
    pub(crate) fn with(products: Vec<Product>) -> Self {
        Self {
            products: Mutex::new(products),
            calls: Mutex::new(Vec::new()),
            faults: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(42),
        }
    }

    pub(crate) fn fail_next(&self, op: &'static str, fault: Fault) {
        self.faults.lock().unwrap().push((op, fault));
    }

    fn record(&self, call: Call, op: &'static str) -> Result<(), ApiError> {
        self.calls.lock().unwrap().push((call, Instant::now()));
        let mut faults = self.faults.lock().unwrap();
        match faults.iter().position(|(o, _)| *o == op) {
            Some(i) => Err(faults.remove(i).1.into_error()),
            None => Ok(()),
        }
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().iter().map(|(c, _)| c.clone()).collect()
    }

    fn list_calls(&self) -> Vec<(ListQuery, Instant)> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter_map(|(c, at)| match c {
                Call::List(q) => Some((q.clone(), *at)),
                _ => None,
            })
            .collect()
    }

    fn not_found() -> ApiError {
        ApiError::Rejected {
            status: 404,
            message: None,
        }
    }
}

#[async_trait]
impl CatalogApi for FakeCatalog {
    async fn list(&self, query: &ListQuery) -> Result<Vec<Product>, ApiError> {
        self.record(Call::List(query.clone()), "list")?;
        Ok(self.products.lock().unwrap().clone())
    }

    async fn get(&self, id: &ProductId) -> Result<Product, ApiError> {
        self.record(Call::Get(id.clone()), "get")?;
        self.products
            .lock()
            .unwrap()
            .iter()
            .find(|p| &p.id == id)
            .cloned()
            .ok_or_else(Self::not_found)
    }

    async fn create(&self, payload: &ProductPayload) -> Result<Product, ApiError> {
        self.record(Call::Create(payload.clone()), "create")?;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let product = Product {
            id: ProductId::new(id.to_string()),
            name: payload.name.clone(),
            category: Some(payload.category.clone()),
            price: payload.price,
            stock_quantity: payload.stock_quantity,
            description: Some(payload.description.clone()),
            created_at: None,
        };
        self.products.lock().unwrap().insert(0, product.clone());
        Ok(product)
    }

    async fn update(&self, id: &ProductId, payload: &ProductPayload) -> Result<Product, ApiError> {
        self.record(Call::Update(id.clone(), payload.clone()), "update")?;
        let mut products = self.products.lock().unwrap();
        let product = products
            .iter_mut()
            .find(|p| &p.id == id)
            .ok_or_else(Self::not_found)?;
        product.name = payload.name.clone();
        product.category = Some(payload.category.clone());
        product.price = payload.price;
        product.stock_quantity = payload.stock_quantity;
        product.description = Some(payload.description.clone());
        Ok(product.clone())
    }

    async fn delete(&self, id: &ProductId) -> Result<(), ApiError> {
        self.record(Call::Delete(id.clone()), "delete")?;
        let mut products = self.products.lock().unwrap();
        let before = products.len();
        products.retain(|p| &p.id != id);
        if products.len() == before {
            return Err(Self::not_found());
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Shown {
    List(ListView),
    Error(String),
    AddMessage(String),
    AddReset,
    EditOpened(ProductId, ProductForm),
    EditMessage(String),
    EditClosed,
}

#[derive(Default)]
pub(crate) struct RecordingView {
    pub(crate) shown: Vec<Shown>,
}

impl View for RecordingView {
    fn render_list(&mut self, list: &ListView) {
        self.shown.push(Shown::List(list.clone()));
    }

    fn show_error(&mut self, message: &str) {
        self.shown.push(Shown::Error(message.to_string()));
    }

    fn show_add_message(&mut self, message: &str) {
        self.shown.push(Shown::AddMessage(message.to_string()));
    }

    fn reset_add_form(&mut self) {
        self.shown.push(Shown::AddReset);
    }

    fn open_edit_dialog(&mut self, id: &ProductId, form: &ProductForm) {
        self.shown.push(Shown::EditOpened(id.clone(), form.clone()));
    }

    fn show_edit_message(&mut self, message: &str) {
        self.shown.push(Shown::EditMessage(message.to_string()));
    }

    fn close_edit_dialog(&mut self) {
        self.shown.push(Shown::EditClosed);
    }
}

struct Answer {
    yes: bool,
    prompts: Vec<String>,
}

impl Answer {
    fn new(yes: bool) -> Self {
        Self {
            yes,
            prompts: Vec::new(),
        }
    }
}

#[async_trait]
impl Confirm for Answer {
    async fn confirm(&mut self, prompt: &str) -> bool {
        self.prompts.push(prompt.to_string());
        self.yes
    }
}

pub(crate) type TestConsole = Console<FakeCatalog, RecordingView>;

pub(crate) fn product(id: &str, name: &str, price: f64, stock: i64) -> Product {
    Product {
        id: ProductId::new(id),
        name: name.to_string(),
        category: Some("Electronics".to_string()),
        price,
        stock_quantity: stock,
        description: Some(format!("{name} description")),
        created_at: None,
    }
}

fn gadget() -> Product {
    Product {
        id: ProductId::new("7"),
        name: "Gadget".to_string(),
        category: None,
        price: 3.0,
        stock_quantity: 0,
        description: None,
        created_at: None,
    }
}

pub(crate) fn console_with(products: Vec<Product>) -> TestConsole {
    Console::new(
        FakeCatalog::with(products),
        RecordingView::default(),
        Options::default(),
    )
}

pub(crate) fn api(console: &TestConsole) -> &FakeCatalog {
    console.coordinator().api()
}

pub(crate) async fn shown(console: &TestConsole) -> Vec<Shown> {
    console.view().lock().await.shown.clone()
}

async fn clear_shown(console: &TestConsole) {
    console.view().lock().await.shown.clear();
}

fn fields(pairs: &[(FormField, &str)]) -> Vec<(FormField, String)> {
    pairs.iter().map(|(f, v)| (*f, v.to_string())).collect()
}

async fn settle() {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
}

// --- list ---

#[tokio::test]
async fn start_renders_rows_in_server_order() {
    let console = console_with(vec![
        product("2", "Mouse", 1800.0, 30),
        product("1", "Laptop", 50000.0, 5),
    ]);
    assert_eq!(console.start().await.unwrap(), 2);

    let shown = shown(&console).await;
    let Some(Shown::List(list)) = shown.last() else {
        panic!("expected a rendered list, got {shown:?}");
    };
    assert!(!list.table.empty_state_visible);
    let names: Vec<_> = list.table.rows.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Mouse", "Laptop"]);
    assert_eq!(list.table.rows[1].price, "50,000");
}

#[tokio::test]
async fn empty_catalog_shows_empty_state() {
    let console = console_with(vec![]);
    assert_eq!(console.start().await.unwrap(), 0);
    let shown = shown(&console).await;
    assert!(matches!(
        shown.last(),
        Some(Shown::List(list)) if list.table.empty_state_visible && list.table.rows.is_empty()
    ));
}

#[tokio::test]
async fn refresh_uses_current_trimmed_inputs() {
    let console = Console::new(
        FakeCatalog::with(vec![]),
        RecordingView::default(),
        Options {
            inputs: QueryInputs {
                search: "  lap ".to_string(),
                category: " Electronics".to_string(),
                sort: SortKey::PriceAsc,
            },
            ..Options::default()
        },
    );
    console.refresh().await.unwrap();
    assert_eq!(
        api(&console).calls(),
        vec![Call::List(ListQuery {
            search: "lap".to_string(),
            category: "Electronics".to_string(),
            sort: SortKey::PriceAsc,
        })]
    );
}

#[tokio::test]
async fn failed_refresh_reports_error_and_keeps_table() {
    let console = console_with(vec![product("1", "Laptop", 50000.0, 5)]);
    console.start().await.unwrap();
    clear_shown(&console).await;

    api(&console).fail_next("list", Fault::Garbled);
    assert!(console.refresh().await.is_err());

    let shown = shown(&console).await;
    assert_eq!(shown.len(), 1);
    assert!(matches!(&shown[0], Shown::Error(m) if m.starts_with("Failed to load products")));
}

#[tokio::test(start_paused = true)]
async fn typing_burst_sends_one_list_request_after_quiet_period() {
    let console = console_with(vec![]);

    console.set_search("l").await;
    advance(Duration::from_millis(100)).await;
    console.set_search("la").await;
    advance(Duration::from_millis(100)).await;
    console.set_search("lap").await;
    let last_keystroke = Instant::now();
    settle().await;

    advance(Duration::from_millis(249)).await;
    settle().await;
    assert!(api(&console).list_calls().is_empty());

    advance(Duration::from_millis(1)).await;
    settle().await;
    let calls = api(&console).list_calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0.search, "lap");
    assert_eq!(
        calls[0].1.duration_since(last_keystroke),
        Duration::from_millis(250)
    );
}

#[tokio::test(start_paused = true)]
async fn each_list_input_has_its_own_timer() {
    let console = console_with(vec![]);

    console.set_search("lap").await;
    settle().await;
    advance(Duration::from_millis(50)).await;
    console.set_sort(SortKey::NameAsc).await;
    settle().await;
    tokio::time::sleep(Duration::from_millis(400)).await;
    settle().await;

    let calls = api(&console).list_calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[1].0.sort, SortKey::NameAsc);
}

// --- create ---

#[tokio::test]
async fn create_rejects_empty_name_without_request() {
    let console = console_with(vec![]);
    let outcome = console
        .add(fields(&[(FormField::Price, "9.99"), (FormField::Stock, "5")]))
        .await;
    assert_eq!(outcome, Submission::Invalid(ValidationError::NameRequired));
    assert!(api(&console).calls().is_empty());
    assert_eq!(
        shown(&console).await.last(),
        Some(&Shown::AddMessage("Name is required".to_string()))
    );
}

#[tokio::test]
async fn create_rejects_non_positive_price_without_request() {
    let console = console_with(vec![]);
    for price in ["0", "-3", ""] {
        let outcome = console
            .add(fields(&[(FormField::Name, "Widget"), (FormField::Price, price)]))
            .await;
        assert_eq!(outcome, Submission::Invalid(ValidationError::PriceNotPositive));
        assert_eq!(
            shown(&console).await.last(),
            Some(&Shown::AddMessage("Price must be > 0".to_string()))
        );
    }
    assert!(api(&console).calls().is_empty());
}

#[tokio::test]
async fn create_rejects_negative_stock_without_request() {
    let console = console_with(vec![]);
    let outcome = console
        .add(fields(&[
            (FormField::Name, "Widget"),
            (FormField::Price, "1"),
            (FormField::Stock, "-1"),
        ]))
        .await;
    assert_eq!(outcome, Submission::Invalid(ValidationError::NegativeStock));
    assert!(api(&console).calls().is_empty());
    assert_eq!(
        shown(&console).await.last(),
        Some(&Shown::AddMessage("Stock must be ≥ 0".to_string()))
    );
}

#[tokio::test]
async fn create_success_resets_form_confirms_and_refreshes() {
    let console = console_with(vec![]);
    let outcome = console
        .add(fields(&[
            (FormField::Name, "Widget"),
            (FormField::Price, "9.99"),
            (FormField::Stock, "5"),
        ]))
        .await;

    let Submission::Saved(created) = outcome else {
        panic!("expected saved, got {outcome:?}");
    };
    assert_eq!(created.id, ProductId::new("42"));
    assert_eq!(console.add_draft().await, ProductForm::default());

    let calls = api(&console).calls();
    assert_eq!(
        calls[0],
        Call::Create(ProductPayload {
            name: "Widget".to_string(),
            category: String::new(),
            price: 9.99,
            stock_quantity: 5,
            description: String::new(),
        })
    );
    assert!(matches!(calls[1], Call::List(_)));

    let shown = shown(&console).await;
    assert_eq!(
        shown[..3],
        [
            Shown::AddMessage(String::new()),
            Shown::AddReset,
            Shown::AddMessage("Added \"Widget\" (ID 42)".to_string()),
        ]
    );
    assert!(matches!(&shown[3], Shown::List(l) if l.table.rows.len() == 1));
}

#[tokio::test]
async fn create_shows_server_error_and_keeps_draft() {
    let console = console_with(vec![]);
    api(&console).fail_next(
        "create",
        Fault::Reject {
            status: 400,
            message: Some("Invalid price or stock".to_string()),
        },
    );
    let outcome = console
        .add(fields(&[(FormField::Name, "Widget"), (FormField::Price, "2")]))
        .await;
    assert_eq!(
        outcome,
        Submission::Rejected("Invalid price or stock".to_string())
    );
    assert_eq!(console.add_draft().await.name, "Widget");
    assert_eq!(
        shown(&console).await.last(),
        Some(&Shown::AddMessage("Invalid price or stock".to_string()))
    );
    assert_eq!(api(&console).list_calls().len(), 0);

    // correcting one field resubmits the kept draft
    let outcome = console.add(fields(&[(FormField::Price, "3")])).await;
    assert!(outcome.is_saved());
}

#[tokio::test]
async fn create_falls_back_to_generic_message() {
    let console = console_with(vec![]);
    api(&console).fail_next(
        "create",
        Fault::Reject {
            status: 500,
            message: None,
        },
    );
    let outcome = console
        .add(fields(&[(FormField::Name, "Widget"), (FormField::Price, "2")]))
        .await;
    assert_eq!(
        outcome,
        Submission::Rejected("Failed to add product".to_string())
    );
}

// --- edit ---

#[tokio::test]
async fn edit_opens_dialog_with_blank_optionals() {
    let console = console_with(vec![gadget()]);
    assert_eq!(console.edit(&ProductId::new("7")).await, OpenOutcome::Opened);

    let expected = ProductForm {
        name: "Gadget".to_string(),
        category: String::new(),
        price: "3".to_string(),
        stock: "0".to_string(),
        description: String::new(),
    };
    assert_eq!(
        console.edit_state().await,
        EditDialog::Open {
            id: ProductId::new("7"),
            form: expected.clone(),
        }
    );
    assert_eq!(
        shown(&console).await,
        vec![
            Shown::EditMessage(String::new()),
            Shown::EditOpened(ProductId::new("7"), expected),
        ]
    );
}

#[tokio::test]
async fn edit_fetch_failure_keeps_dialog_closed() {
    let console = console_with(vec![]);
    let outcome = console.edit(&ProductId::new("7")).await;
    assert_eq!(outcome, OpenOutcome::Failed("Product 7 not found".to_string()));
    assert_eq!(console.edit_state().await, EditDialog::Closed);
    assert_eq!(
        shown(&console).await,
        vec![Shown::Error("Product 7 not found".to_string())]
    );
}

#[tokio::test]
async fn edit_validation_keeps_dialog_open_without_request() {
    let console = console_with(vec![gadget()]);
    console.edit(&ProductId::new("7")).await;

    let cases = [
        (FormField::Name, " ", "Name is required"),
        (FormField::Price, "0", "Price must be > 0"),
        (FormField::Stock, "-2", "Stock must be ≥ 0"),
    ];
    for (field, bad, message) in cases {
        console.edit(&ProductId::new("7")).await;
        assert!(console.set(fields(&[(field, bad)])).await);
        let outcome = console.save().await.unwrap();
        assert!(matches!(outcome, Submission::Invalid(_)));
        assert_eq!(
            shown(&console).await.last(),
            Some(&Shown::EditMessage(message.to_string()))
        );
        assert!(console.edit_state().await.is_open());
    }
    assert!(api(&console)
        .calls()
        .iter()
        .all(|c| matches!(c, Call::Get(_))));
}

#[tokio::test]
async fn edit_save_updates_closes_and_refreshes() {
    let console = console_with(vec![gadget()]);
    console.edit(&ProductId::new("7")).await;
    console
        .set(fields(&[
            (FormField::Category, "Toys"),
            (FormField::Price, "4.5"),
        ]))
        .await;

    let outcome = console.save().await.unwrap();
    assert!(outcome.is_saved());
    assert_eq!(console.edit_state().await, EditDialog::Closed);

    let calls = api(&console).calls();
    assert_eq!(
        calls[1],
        Call::Update(
            ProductId::new("7"),
            ProductPayload {
                name: "Gadget".to_string(),
                category: "Toys".to_string(),
                price: 4.5,
                stock_quantity: 0,
                description: String::new(),
            }
        )
    );
    assert!(matches!(calls[2], Call::List(_)));
    let shown = shown(&console).await;
    assert!(shown.contains(&Shown::EditClosed));
    assert!(matches!(shown.last(), Some(Shown::List(l)) if l.table.rows[0].category == "Toys"));
}

#[tokio::test]
async fn edit_save_failure_shows_message_and_stays_open() {
    let console = console_with(vec![gadget()]);
    console.edit(&ProductId::new("7")).await;
    api(&console).fail_next(
        "update",
        Fault::Reject {
            status: 500,
            message: None,
        },
    );
    let outcome = console.save().await.unwrap();
    assert_eq!(outcome, Submission::Rejected("Update failed".to_string()));
    assert!(console.edit_state().await.is_open());
    assert_eq!(
        shown(&console).await.last(),
        Some(&Shown::EditMessage("Update failed".to_string()))
    );
}

#[tokio::test]
async fn cancel_discards_edits_without_request() {
    let console = console_with(vec![gadget()]);
    console.edit(&ProductId::new("7")).await;
    console.set(fields(&[(FormField::Name, "Renamed")])).await;
    assert!(console.cancel().await);
    assert_eq!(console.edit_state().await, EditDialog::Closed);
    assert_eq!(api(&console).calls(), vec![Call::Get(ProductId::new("7"))]);

    assert!(!console.cancel().await);
    assert!(console.save().await.is_none());
    assert!(!console.set(fields(&[(FormField::Name, "x")])).await);
}

#[tokio::test]
async fn opening_another_product_replaces_the_copy() {
    let console = console_with(vec![gadget(), product("8", "Widget", 2.0, 1)]);
    console.edit(&ProductId::new("7")).await;
    console.set(fields(&[(FormField::Name, "Unsaved")])).await;
    console.edit(&ProductId::new("8")).await;

    match console.edit_state().await {
        EditDialog::Open { id, form } => {
            assert_eq!(id, ProductId::new("8"));
            assert_eq!(form.name, "Widget");
            assert_eq!(form.category, "Electronics");
        }
        EditDialog::Closed => panic!("dialog should be open"),
    }
}

// --- delete ---

#[tokio::test]
async fn declined_delete_sends_nothing() {
    let console = console_with(vec![gadget()]);
    let mut answer = Answer::new(false);
    let outcome = console.delete(&ProductId::new("7"), &mut answer).await;
    assert_eq!(outcome, DeleteOutcome::Declined);
    assert_eq!(answer.prompts, vec!["Delete this product?".to_string()]);
    assert!(api(&console).calls().is_empty());
    assert!(shown(&console).await.is_empty());
}

#[tokio::test]
async fn confirmed_delete_refreshes_list() {
    let console = console_with(vec![gadget()]);
    let outcome = console
        .delete(&ProductId::new("7"), &mut Answer::new(true))
        .await;
    assert_eq!(outcome, DeleteOutcome::Deleted);
    let calls = api(&console).calls();
    assert_eq!(calls[0], Call::Delete(ProductId::new("7")));
    assert!(matches!(calls[1], Call::List(_)));
    assert!(matches!(
        shown(&console).await.last(),
        Some(Shown::List(l)) if l.table.empty_state_visible
    ));
}

#[tokio::test]
async fn failed_delete_is_reported_and_skips_refresh() {
    let console = console_with(vec![]);
    let outcome = console
        .delete(&ProductId::new("7"), &mut Answer::new(true))
        .await;
    assert_eq!(
        outcome,
        DeleteOutcome::Failed("Product 7 not found".to_string())
    );
    assert_eq!(api(&console).list_calls().len(), 0);
    assert_eq!(
        shown(&console).await,
        vec![Shown::Error("Product 7 not found".to_string())]
    );
}

// --- export ---

#[tokio::test]
async fn export_writes_page_without_touching_view() {
    let console = console_with(vec![product("1", "<Laptop>", 50000.0, 5)]);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("catalog.html");

    assert_eq!(console.export_html(&path).await.unwrap(), 1);
    let html = std::fs::read_to_string(&path).unwrap();
    assert!(html.contains("&lt;Laptop&gt;"));
    assert!(html.contains("50,000"));
    assert!(shown(&console).await.is_empty());
}

#[tokio::test]
async fn console_reports_configured_debounce_and_inputs() {
    let console = Console::new(
        FakeCatalog::with(vec![]),
        RecordingView::default(),
        Options {
            debounce: Duration::from_millis(100),
            ..Options::default()
        },
    );
    assert_eq!(console.debounce(), Duration::from_millis(100));

    console.set_category("Books").await;
    console.set_sort(SortKey::NameDesc).await;
    let inputs = console.coordinator().inputs().await;
    assert_eq!(inputs.category, "Books");
    assert_eq!(inputs.sort, SortKey::NameDesc);
    assert_eq!(inputs.search, "");
}
