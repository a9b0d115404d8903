//! In-memory backend for flow tests
//!
//! Mirrors the behaviour the flows rely on: adding a product already on the
//! table merges into its line, paying clears the lines, temporary tables
//! disappear once paid. `fail_next(op)` makes the next call of `op` fail with
//! a server error, `reject_next(op)` with a 401.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use loto_client::{ClientError, ClientResult, InvoiceQuery, PosApi};
use shared::models::{
    ConsumptionCreate, ConsumptionLine, ConsumptionUpdate, Invoice, InvoiceLine, InvoiceTableRef,
    LineProduct, Product, Role, Table, TableConsumption, TableCreate, TableState, User, UserCreate,
    UserUpdate,
};
use shared::money;

pub fn table(id: &str, number: u32, temporary: bool, occupied: bool) -> Table {
    Table {
        id: id.to_string(),
        number,
        state: if occupied {
            TableState::Occupied
        } else {
            TableState::Free
        },
        temporary,
    }
}

pub fn product(id: &str, name: &str, price: f64, category: Option<&str>) -> Product {
    Product {
        id: id.to_string(),
        name: name.to_string(),
        price,
        category: category.map(str::to_string),
    }
}

pub fn user(id: &str, name: &str, role: Role) -> User {
    User {
        id: id.to_string(),
        name: name.to_string(),
        email: format!("{}@flor.co", name.to_lowercase()),
        role,
        active: true,
        created_at: None,
    }
}

pub fn invoice(id: &str, number: u64, total: f64, created_at: DateTime<Utc>) -> Invoice {
    Invoice {
        id: id.to_string(),
        number,
        total,
        created_at,
        table: Some(InvoiceTableRef { number: 3 }),
        issued_by: None,
    }
}

#[derive(Default)]
struct State {
    tables: Vec<Table>,
    lines: Vec<ConsumptionLine>,
    products: Vec<Product>,
    invoices: Vec<Invoice>,
    invoice_lines: HashMap<String, Vec<InvoiceLine>>,
    users: Vec<User>,
    paid: Vec<String>,
    /// (operation, answer with 401)
    failures: Vec<(String, bool)>,
    calls: Vec<String>,
    next_id: u32,
}

impl State {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}{}", self.next_id)
    }

    /// Log the call and consume a pending injected failure
    fn enter(&mut self, op: &str) -> ClientResult<()> {
        self.calls.push(op.to_string());
        if let Some(pos) = self.failures.iter().position(|(f, _)| f == op) {
            let (_, unauthorized) = self.failures.remove(pos);
            if unauthorized {
                return Err(ClientError::Unauthorized);
            }
            return Err(ClientError::Server {
                status: 500,
                message: format!("injected failure in {op}"),
            });
        }
        Ok(())
    }

    fn table_lines(&self, table_id: &str) -> Vec<ConsumptionLine> {
        self.lines
            .iter()
            .filter(|l| l.table_id.as_deref() == Some(table_id))
            .cloned()
            .collect()
    }
}

#[derive(Default)]
pub struct FakeBackend {
    state: Mutex<State>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn with<R>(&self, f: impl FnOnce(&mut State) -> R) -> R {
        let mut state = self.state.lock().unwrap();
        f(&mut state)
    }

    pub fn add_table(&self, table: Table) -> Table {
        self.with(|s| s.tables.push(table.clone()));
        table
    }

    pub fn add_product(&self, product: Product) -> Product {
        self.with(|s| s.products.push(product.clone()));
        product
    }

    pub fn add_user(&self, user: User) -> User {
        self.with(|s| s.users.push(user.clone()));
        user
    }

    /// Put a line straight into the backend (no call logged)
    pub fn add_line(&self, table_id: &str, product: &Product, quantity: u32) -> String {
        self.with(|s| {
            let id = s.next_id("c");
            s.lines.push(ConsumptionLine {
                id: id.clone(),
                table_id: Some(table_id.to_string()),
                product: LineProduct {
                    id: product.id.clone(),
                    name: product.name.clone(),
                    price: product.price,
                },
                quantity,
                subtotal: money::line_subtotal(product.price, quantity),
                comment: None,
            });
            id
        })
    }

    pub fn add_invoice(&self, invoice: Invoice, lines: Vec<InvoiceLine>) {
        self.with(|s| {
            s.invoice_lines.insert(invoice.id.clone(), lines);
            s.invoices.push(invoice);
        });
    }

    pub fn fail_next(&self, op: &str) {
        self.with(|s| s.failures.push((op.to_string(), false)));
    }

    pub fn reject_next(&self, op: &str) {
        self.with(|s| s.failures.push((op.to_string(), true)));
    }

    pub fn calls(&self) -> Vec<String> {
        self.with(|s| s.calls.clone())
    }

    pub fn lines_of(&self, table_id: &str) -> Vec<ConsumptionLine> {
        self.with(|s| s.table_lines(table_id))
    }

    pub fn tables(&self) -> Vec<Table> {
        self.with(|s| s.tables.clone())
    }

    pub fn users(&self) -> Vec<User> {
        self.with(|s| s.users.clone())
    }

    pub fn invoice_count(&self) -> usize {
        self.with(|s| s.invoices.len())
    }

    pub fn paid_tables(&self) -> Vec<String> {
        self.with(|s| s.paid.clone())
    }

    /// Change a table behind the client's back
    pub fn set_table_state(&self, table_id: &str, state: TableState) {
        self.with(|s| {
            if let Some(t) = s.tables.iter_mut().find(|t| t.id == table_id) {
                t.state = state;
            }
        });
    }
}

fn parse_bound(value: &str) -> ClientResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| ClientError::Validation(e.to_string()))
}

#[async_trait]
impl PosApi for FakeBackend {
    async fn list_tables(&self) -> ClientResult<Vec<Table>> {
        self.with(|s| {
            s.enter("list_tables")?;
            Ok(s.tables.clone())
        })
    }

    async fn create_table(&self, table: &TableCreate) -> ClientResult<Table> {
        self.with(|s| {
            s.enter("create_table")?;
            let created = Table {
                id: s.next_id("t"),
                number: table.number,
                state: table.state,
                temporary: table.temporary,
            };
            s.tables.push(created.clone());
            Ok(created)
        })
    }

    async fn table_consumption(&self, table_id: &str) -> ClientResult<TableConsumption> {
        self.with(|s| {
            s.enter("table_consumption")?;
            let lines = s.table_lines(table_id);
            let total = money::sum(lines.iter().map(|l| l.subtotal));
            Ok(TableConsumption {
                lines,
                total: Some(total),
            })
        })
    }

    async fn add_consumption(&self, line: &ConsumptionCreate) -> ClientResult<()> {
        self.with(|s| {
            s.enter("add_consumption")?;
            if let Some(existing) = s.lines.iter_mut().find(|l| {
                l.table_id.as_deref() == Some(line.table_id.as_str())
                    && l.product.id == line.product_id
            }) {
                existing.quantity += line.quantity;
                existing.subtotal = existing.computed_subtotal();
            } else {
                let product = s
                    .products
                    .iter()
                    .find(|p| p.id == line.product_id)
                    .cloned()
                    .ok_or_else(|| ClientError::Validation("unknown product".into()))?;
                let id = s.next_id("c");
                s.lines.push(ConsumptionLine {
                    id,
                    table_id: Some(line.table_id.clone()),
                    product: LineProduct {
                        id: product.id,
                        name: product.name,
                        price: product.price,
                    },
                    quantity: line.quantity,
                    subtotal: money::line_subtotal(product.price, line.quantity),
                    comment: None,
                });
            }
            if let Some(t) = s.tables.iter_mut().find(|t| t.id == line.table_id) {
                t.state = TableState::Occupied;
            }
            Ok(())
        })
    }

    async fn update_consumption(
        &self,
        line_id: &str,
        update: &ConsumptionUpdate,
    ) -> ClientResult<()> {
        self.with(|s| {
            s.enter("update_consumption")?;
            let line = s
                .lines
                .iter_mut()
                .find(|l| l.id == line_id)
                .ok_or_else(|| ClientError::NotFound(format!("consumo {line_id}")))?;
            line.quantity = update.quantity;
            line.subtotal = line.computed_subtotal();
            if let Some(comment) = &update.comment {
                line.comment = Some(comment.clone());
            }
            Ok(())
        })
    }

    async fn delete_consumption(&self, line_id: &str) -> ClientResult<()> {
        self.with(|s| {
            s.enter("delete_consumption")?;
            let before = s.lines.len();
            s.lines.retain(|l| l.id != line_id);
            if s.lines.len() == before {
                return Err(ClientError::NotFound(format!("consumo {line_id}")));
            }
            Ok(())
        })
    }

    async fn pay_table(&self, table_id: &str) -> ClientResult<()> {
        self.with(|s| {
            s.enter("pay_table")?;
            s.paid.push(table_id.to_string());
            s.lines.retain(|l| l.table_id.as_deref() != Some(table_id));
            s.tables.retain(|t| !(t.id == table_id && t.temporary));
            if let Some(t) = s.tables.iter_mut().find(|t| t.id == table_id) {
                t.state = TableState::Free;
            }
            Ok(())
        })
    }

    async fn generate_invoice(&self, table_id: &str) -> ClientResult<Option<Invoice>> {
        self.with(|s| {
            s.enter("generate_invoice")?;
            let lines = s.table_lines(table_id);
            let table_number = s
                .tables
                .iter()
                .find(|t| t.id == table_id)
                .map(|t| t.number);
            let id = s.next_id("f");
            let invoice = Invoice {
                id: id.clone(),
                number: s.invoices.len() as u64 + 1,
                total: money::sum(lines.iter().map(|l| l.subtotal)),
                created_at: Utc::now(),
                table: table_number.map(|number| InvoiceTableRef { number }),
                issued_by: None,
            };
            let detail = lines
                .iter()
                .map(|l| InvoiceLine {
                    id: format!("{id}-{}", l.id),
                    factura_id: id.clone(),
                    product_id: l.product.id.clone(),
                    product_name: l.product.name.clone(),
                    quantity: l.quantity,
                    unit_price: l.product.price,
                    subtotal: l.subtotal,
                })
                .collect();
            s.invoice_lines.insert(id, detail);
            s.invoices.push(invoice.clone());
            Ok(Some(invoice))
        })
    }

    async fn list_invoices(&self, query: Option<&InvoiceQuery>) -> ClientResult<Vec<Invoice>> {
        let bounds = match query {
            Some(q) => Some((parse_bound(&q.start)?, parse_bound(&q.end)?)),
            None => None,
        };
        self.with(|s| {
            s.enter("list_invoices")?;
            Ok(s.invoices
                .iter()
                .filter(|inv| {
                    bounds.is_none_or(|(start, end)| inv.created_at >= start && inv.created_at <= end)
                })
                .cloned()
                .collect())
        })
    }

    async fn invoice_lines(&self, invoice_id: &str) -> ClientResult<Vec<InvoiceLine>> {
        self.with(|s| {
            s.enter("invoice_lines")?;
            s.invoice_lines
                .get(invoice_id)
                .cloned()
                .ok_or_else(|| ClientError::NotFound(format!("factura {invoice_id}")))
        })
    }

    async fn list_products(&self) -> ClientResult<Vec<Product>> {
        self.with(|s| {
            s.enter("list_products")?;
            Ok(s.products.clone())
        })
    }

    async fn list_users(&self) -> ClientResult<Vec<User>> {
        self.with(|s| {
            s.enter("list_users")?;
            Ok(s.users.clone())
        })
    }

    async fn create_user(&self, user: &UserCreate) -> ClientResult<()> {
        self.with(|s| {
            s.enter("create_user")?;
            if s.users.iter().any(|u| u.email == user.email) {
                return Err(ClientError::Validation("email already registered".into()));
            }
            let id = s.next_id("u");
            s.users.push(User {
                id,
                name: user.name.clone(),
                email: user.email.clone(),
                role: user.role,
                active: true,
                created_at: Some(Utc::now().to_rfc3339()),
            });
            Ok(())
        })
    }

    async fn update_user(&self, user_id: &str, update: &UserUpdate) -> ClientResult<()> {
        self.with(|s| {
            s.enter("update_user")?;
            let user = s
                .users
                .iter_mut()
                .find(|u| u.id == user_id)
                .ok_or_else(|| ClientError::NotFound(format!("usuario {user_id}")))?;
            if let Some(name) = &update.name {
                user.name = name.clone();
            }
            if let Some(email) = &update.email {
                user.email = email.clone();
            }
            if let Some(role) = update.role {
                user.role = role;
            }
            Ok(())
        })
    }

    async fn delete_user(&self, user_id: &str) -> ClientResult<()> {
        self.with(|s| {
            s.enter("delete_user")?;
            let user = s
                .users
                .iter_mut()
                .find(|u| u.id == user_id)
                .ok_or_else(|| ClientError::NotFound(format!("usuario {user_id}")))?;
            user.active = false;
            Ok(())
        })
    }
}
