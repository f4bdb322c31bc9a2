use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use family_budget::finance::format_inr;
use family_budget::pages::assistant::{self, AssistantContext};
use family_budget::pages::healthcare::JAN_AUSHADHI;
use family_budget::pages::investments::round_up_savings;
use family_budget::pages::schemes::{eligible, EligibilityQuery};
use family_budget::pages::summary::{FinancialSummary, SummarySources};
use family_budget::pages::{
    BudgetPlan, ClothingBudget, DashboardOverview, ExpenseLedger, FamilyBudget, GoalTracker,
    HealthLog, OnlineBanking, PasswordVault, Portfolio, Profile, ReminderBoard, SubscriptionList,
};
use family_budget::routes::sidebar;
use family_budget::{AuthSession, Language, LanguageState, LocalStore, Page, Persisted};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, List, ListItem, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};
use std::io;
use tracing::{info, warn};

/// Questions the assistant page answers on open.
const SAMPLE_QUESTIONS: [&str; 5] = [
    "What is my bank balance?",
    "How much did I spend this month?",
    "Any bills due?",
    "Which schemes can I get?",
    "Give me a money tip",
];

struct PageData {
    profile: Profile,
    ledger: ExpenseLedger,
    plan: BudgetPlan,
    goals: GoalTracker,
    reminders: ReminderBoard,
    banking: OnlineBanking,
    vault: PasswordVault,
    health: HealthLog,
    subscriptions: SubscriptionList,
    clothing: ClothingBudget,
    investments: Portfolio,
    family: FamilyBudget,
}

impl PageData {
    fn load(store: &LocalStore, session: &AuthSession) -> Result<Self> {
        Ok(PageData {
            profile: Profile::load_for(store, session.current_user())?,
            ledger: ExpenseLedger::load(store)?,
            plan: BudgetPlan::load(store)?,
            goals: GoalTracker::load(store)?,
            reminders: ReminderBoard::load(store)?,
            banking: OnlineBanking::load(store)?,
            vault: PasswordVault::load(store)?,
            health: HealthLog::load(store)?,
            subscriptions: SubscriptionList::load(store)?,
            clothing: ClothingBudget::load(store)?,
            investments: Portfolio::load(store)?,
            family: FamilyBudget::load(store)?,
        })
    }
}

/// What one page shows: headline figures plus a selectable table.
pub struct PageView {
    pub summary: Vec<(String, String)>,
    pub headers: Vec<&'static str>,
    pub rows: Vec<Vec<String>>,
}

pub struct App {
    store: LocalStore,
    today: NaiveDate,
    session: AuthSession,
    language: LanguageState,
    data: PageData,
    pub current_page: Page,
    pub state: TableState,
    pub show_detail: bool,
    pub status: Option<String>,
}

impl App {
    pub fn new(store: LocalStore, today: NaiveDate) -> Result<Self> {
        let session = AuthSession::restore(&store).context("restoring session")?;
        let language = LanguageState::load(&store).context("loading language")?;
        let data = PageData::load(&store, &session).context("loading pages")?;

        let mut state = TableState::default();
        state.select(Some(0));

        Ok(Self {
            store,
            today,
            session,
            language,
            data,
            current_page: Page::Dashboard,
            state,
            show_detail: false,
            status: None,
        })
    }

    pub fn t(&self, key: &str) -> String {
        self.language.t(key)
    }

    pub fn next_page(&mut self) {
        self.open_page(self.current_page.next());
    }

    pub fn previous_page(&mut self) {
        self.open_page(self.current_page.previous());
    }

    /// Switch pages; a page that cannot be computed explains why in the status bar.
    fn open_page(&mut self, page: Page) {
        self.current_page = page;
        self.state.select(Some(0));
        self.status = match page {
            Page::Schemes => eligible(&self.scheme_query()).err().map(|err| err.to_string()),
            _ => None,
        };
    }

    fn scheme_query(&self) -> EligibilityQuery {
        EligibilityQuery {
            annual_income: self.data.profile.monthly_income * 12.0,
            state: self.data.profile.state.clone(),
            category: None,
        }
    }

    pub fn toggle_detail(&mut self) {
        self.show_detail = !self.show_detail;
    }

    pub fn next(&mut self) {
        let len = self.page_view().rows.len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.page_view().rows.len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
    }

    pub fn cycle_language(&mut self) -> Result<()> {
        let all = Language::ALL;
        let pos = all
            .iter()
            .position(|l| *l == self.language.current())
            .unwrap_or(0);
        let next = all[(pos + 1) % all.len()];
        self.language.set_language(&self.store, next)?;
        self.status = Some(format!("Language: {}", next.native_name()));
        Ok(())
    }

    /// `t` on the reminders or OTT page flips the selected row's active flag.
    pub fn toggle_selected(&mut self) -> Result<()> {
        let Some(i) = self.state.selected() else {
            return Ok(());
        };
        match self.current_page {
            Page::Reminders => {
                if let Some(id) = self.data.reminders.all().get(i).map(|r| r.id.clone()) {
                    let r = self.data.reminders.toggle_active(&id)?;
                    self.data.reminders.save(&self.store)?;
                    self.status = Some(format!("{}: {}", r.title, on_off(r.is_active)));
                }
            }
            Page::Ott => {
                if let Some(id) = self.data.subscriptions.all().get(i).map(|s| s.id.clone()) {
                    let s = self.data.subscriptions.toggle(&id)?;
                    self.data.subscriptions.save(&self.store)?;
                    self.status = Some(format!("{}: {}", s.platform, on_off(s.active)));
                }
            }
            _ => {}
        }
        Ok(())
    }

    pub fn reload(&mut self) -> Result<()> {
        self.data = PageData::load(&self.store, &self.session)?;
        self.status = Some("Reloaded".to_string());
        info!("tui data reloaded");
        Ok(())
    }

    pub fn page_view(&self) -> PageView {
        let d = &self.data;
        let (y, m) = (self.today.year(), self.today.month());

        match self.current_page {
            Page::Dashboard => {
                let o = DashboardOverview::build(self.today, &d.plan, &d.ledger, &d.goals, &d.reminders);
                PageView {
                    summary: vec![
                        (self.t("totalIncome"), format_inr(o.income)),
                        (self.t("totalExpenses"), format_inr(o.expenses)),
                        (self.t("savings"), format_inr(o.savings)),
                        (self.t("savingsRate"), format!("{:.1}%", o.savings_rate)),
                        (self.t("upcomingBills"), format!("{} ({})", o.upcoming_bills.len(), format_inr(o.upcoming_total))),
                    ],
                    headers: vec!["Date", "Title", "Category", "Amount"],
                    rows: o
                        .recent_expenses
                        .iter()
                        .map(|e| vec![e.date.to_string(), e.title.clone(), e.category.clone(), format_inr(e.amount)])
                        .collect(),
                }
            }
            Page::Expenses => PageView {
                summary: vec![
                    ("This month".to_string(), format_inr(d.ledger.month_total(y, m))),
                    ("All time".to_string(), format_inr(d.ledger.total())),
                ],
                headers: vec!["Date", "Title", "Category", "Amount", "Paid via"],
                rows: d
                    .ledger
                    .recent(usize::MAX)
                    .iter()
                    .map(|e| {
                        vec![
                            e.date.to_string(),
                            e.title.clone(),
                            e.category.clone(),
                            format_inr(e.amount),
                            e.payment_method.clone(),
                        ]
                    })
                    .collect(),
            },
            Page::Analytics => PageView {
                summary: vec![
                    ("Daily average".to_string(), format_inr(d.ledger.daily_average(y, m))),
                    ("Months tracked".to_string(), d.ledger.monthly_trend().len().to_string()),
                ],
                headers: vec!["Category", "Total", "Share", "Count"],
                rows: d
                    .ledger
                    .category_breakdown()
                    .iter()
                    .map(|c| vec![c.category.clone(), format_inr(c.total), format!("{:.1}%", c.share), c.count.to_string()])
                    .collect(),
            },
            Page::BudgetPlanner => {
                let split = d.plan.allocation();
                PageView {
                    summary: vec![
                        ("Needs".to_string(), format_inr(split.needs)),
                        ("Wants".to_string(), format_inr(split.wants)),
                        ("Savings".to_string(), format_inr(split.savings)),
                        ("Unallocated".to_string(), format_inr(d.plan.unallocated())),
                    ],
                    headers: vec!["Category", "Spent", "Limit", "Used", "Status"],
                    rows: d
                        .plan
                        .utilization(&d.ledger, y, m)
                        .iter()
                        .map(|u| {
                            vec![
                                u.category.clone(),
                                format_inr(u.spent),
                                format_inr(u.limit),
                                format!("{:.0}%", u.percent),
                                format!("{:?}", u.status),
                            ]
                        })
                        .collect(),
                }
            }
            Page::Goals => {
                let s = d.goals.summary();
                PageView {
                    summary: vec![
                        ("Saved".to_string(), format!("{} of {}", format_inr(s.total_saved), format_inr(s.total_target))),
                        ("Completed".to_string(), format!("{}/{}", s.completed, s.total_goals)),
                    ],
                    headers: vec!["Goal", "Saved", "Target", "Progress", "Status", "Days left"],
                    rows: d
                        .goals
                        .all()
                        .iter()
                        .map(|g| {
                            vec![
                                g.title.clone(),
                                format_inr(g.current_amount),
                                format_inr(g.target_amount),
                                format!("{:.0}%", g.progress()),
                                format!("{:?}", g.status),
                                g.days_remaining(self.today).to_string(),
                            ]
                        })
                        .collect(),
                }
            }
            Page::Reminders => PageView {
                summary: vec![
                    ("Active total".to_string(), format_inr(d.reminders.active_total())),
                    ("Overdue".to_string(), d.reminders.overdue(self.today).len().to_string()),
                ],
                headers: vec!["Bill", "Due", "Amount", "Repeats", "Active"],
                rows: d
                    .reminders
                    .all()
                    .iter()
                    .map(|r| {
                        vec![
                            r.title.clone(),
                            r.due_date.to_string(),
                            format_inr(r.amount),
                            format!("{:?}", r.recurring),
                            on_off(r.is_active).to_string(),
                        ]
                    })
                    .collect(),
            },
            Page::FamilyBudget => PageView {
                summary: vec![
                    ("Household income".to_string(), format_inr(d.family.household_income())),
                    ("Shared expenses".to_string(), format_inr(d.family.total_expenses())),
                    ("Savings rate".to_string(), format!("{:.1}%", d.family.savings_rate())),
                ],
                headers: vec!["Member", "Spend"],
                rows: d
                    .family
                    .spend_by_member()
                    .iter()
                    .map(|s| vec![s.name.clone(), format_inr(s.total)])
                    .collect(),
            },
            Page::Banking => {
                let (credit, debit) = d.banking.totals();
                PageView {
                    summary: vec![
                        ("Balance".to_string(), format_inr(d.banking.balance())),
                        ("Credits".to_string(), format_inr(credit)),
                        ("Debits".to_string(), format_inr(debit)),
                    ],
                    headers: vec!["Date", "Description", "Type", "Amount", "Balance"],
                    rows: d
                        .banking
                        .mini_statement(10)
                        .iter()
                        .map(|t| {
                            vec![
                                t.date.to_string(),
                                t.description.clone(),
                                format!("{:?}", t.kind),
                                format_inr(t.amount),
                                format_inr(t.balance),
                            ]
                        })
                        .collect(),
                }
            }
            Page::Passwords => PageView {
                summary: vec![
                    ("Entries".to_string(), d.vault.all().len().to_string()),
                    ("Weak".to_string(), d.vault.weak_entries().len().to_string()),
                    ("Reused groups".to_string(), d.vault.reused().len().to_string()),
                ],
                headers: vec!["Website", "Username", "Password", "Strength"],
                rows: d
                    .vault
                    .masked()
                    .iter()
                    .map(|e| vec![e.website.clone(), e.username.clone(), e.password.clone(), format!("{:?}", e.strength)])
                    .collect(),
            },
            Page::Healthcare => PageView {
                summary: vec![
                    ("Health spend this year".to_string(), format_inr(d.health.annual_total(y))),
                    ("80D headroom".to_string(), format_inr(d.health.section_80d_remaining(y))),
                ],
                headers: vec!["Medicine", "Generic", "Brand", "Jan Aushadhi", "Save"],
                rows: JAN_AUSHADHI
                    .iter()
                    .map(|m| {
                        vec![
                            m.name.to_string(),
                            m.generic_name.to_string(),
                            format_inr(m.brand_price),
                            format_inr(m.generic_price),
                            format!("{:.0}%", m.savings_percent()),
                        ]
                    })
                    .collect(),
            },
            Page::Schemes => {
                let query = self.scheme_query();
                // The status bar carries the reason when the profile is incomplete
                let schemes = eligible(&query).unwrap_or_default();
                PageView {
                    summary: vec![
                        ("Annual income".to_string(), format_inr(query.annual_income)),
                        ("State".to_string(), query.state.clone()),
                    ],
                    headers: vec!["Scheme", "Category", "Benefit"],
                    rows: schemes
                        .iter()
                        .map(|s| vec![s.name.to_string(), s.category.to_string(), s.benefit.to_string()])
                        .collect(),
                }
            }
            Page::Ott => PageView {
                summary: vec![
                    ("Monthly".to_string(), format_inr(d.subscriptions.monthly_total())),
                    ("Yearly".to_string(), format_inr(d.subscriptions.yearly_total())),
                    ("Your share".to_string(), format_inr(d.subscriptions.per_person_cost())),
                ],
                headers: vec!["Platform", "Plan", "Cost", "Cycle", "Renews", "Active"],
                rows: d
                    .subscriptions
                    .all()
                    .iter()
                    .map(|s| {
                        vec![
                            s.platform.clone(),
                            s.plan.clone(),
                            format_inr(s.cost),
                            format!("{:?}", s.billing_cycle),
                            s.next_renewal(self.today).to_string(),
                            on_off(s.active).to_string(),
                        ]
                    })
                    .collect(),
            },
            Page::Clothing => PageView {
                summary: vec![
                    ("Monthly budget".to_string(), format_inr(d.clothing.monthly_budget)),
                    ("Spent".to_string(), format_inr(d.clothing.spent_in_month(y, m))),
                    ("Remaining".to_string(), format_inr(d.clothing.remaining(y, m))),
                ],
                headers: vec!["Date", "Item", "Category", "Amount", "Store"],
                rows: d
                    .clothing
                    .purchases
                    .iter()
                    .map(|p| {
                        vec![
                            p.date.to_string(),
                            p.item.clone(),
                            p.category.clone(),
                            format_inr(p.amount),
                            p.store.clone(),
                        ]
                    })
                    .collect(),
            },
            Page::MicroInvestment => {
                let p = d.investments.portfolio_summary(self.today);
                let spare = round_up_savings(&d.ledger, 10.0);
                PageView {
                    summary: vec![
                        ("Monthly outflow".to_string(), format_inr(p.monthly_outflow)),
                        ("Invested".to_string(), format_inr(p.invested)),
                        ("Projected".to_string(), format_inr(p.projected_value)),
                        ("Round-up savings".to_string(), format_inr(spare.total)),
                    ],
                    headers: vec!["Name", "Kind", "Monthly", "Return", "Matures at"],
                    rows: d
                        .investments
                        .all()
                        .iter()
                        .map(|i| {
                            vec![
                                i.name.clone(),
                                i.kind.label().to_string(),
                                format_inr(i.monthly_amount),
                                format!("{:.1}%", i.expected_return),
                                format_inr(i.projected_value()),
                            ]
                        })
                        .collect(),
                }
            }
            Page::Summary => {
                let report = FinancialSummary::build(
                    self.today,
                    &SummarySources {
                        profile: &d.profile,
                        plan: &d.plan,
                        ledger: &d.ledger,
                        goals: &d.goals,
                        reminders: &d.reminders,
                        banking: &d.banking,
                        subscriptions: &d.subscriptions,
                        investments: &d.investments,
                        health: &d.health,
                    },
                );
                PageView {
                    summary: Vec::new(),
                    headers: vec!["Report"],
                    rows: report.render_text().lines().map(|l| vec![l.to_string()]).collect(),
                }
            }
            Page::Profile => {
                let p = &d.profile;
                PageView {
                    summary: vec![(self.t("language"), self.language.current().native_name().to_string())],
                    headers: vec!["Field", "Value"],
                    rows: vec![
                        vec!["Name".to_string(), p.name.clone()],
                        vec!["Email".to_string(), p.email.clone()],
                        vec!["Phone".to_string(), p.phone.clone()],
                        vec!["City".to_string(), p.city.clone()],
                        vec!["State".to_string(), p.state.clone()],
                        vec!["Monthly income".to_string(), format_inr(p.monthly_income)],
                        vec!["Occupation".to_string(), p.occupation.clone()],
                    ],
                }
            }
            Page::VoiceAssistant => {
                let ctx = AssistantContext {
                    today: self.today,
                    banking: &d.banking,
                    ledger: &d.ledger,
                    plan: &d.plan,
                    goals: &d.goals,
                    reminders: &d.reminders,
                    state: &d.profile.state,
                };
                let mut rng = rand::rng();
                PageView {
                    summary: Vec::new(),
                    headers: vec!["You asked", "Assistant"],
                    rows: SAMPLE_QUESTIONS
                        .iter()
                        .map(|q| vec![q.to_string(), assistant::answer(&mut rng, q, &ctx).answer])
                        .collect(),
                }
            }
        }
    }
}

fn on_off(active: bool) -> &'static str {
    if active {
        "on"
    } else {
        "off"
    }
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            let outcome = match key.code {
                KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                KeyCode::Enter => {
                    app.toggle_detail();
                    Ok(())
                }
                KeyCode::Tab if key.modifiers.contains(KeyModifiers::SHIFT) => {
                    app.previous_page();
                    Ok(())
                }
                KeyCode::BackTab => {
                    app.previous_page();
                    Ok(())
                }
                KeyCode::Tab => {
                    app.next_page();
                    Ok(())
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    app.next();
                    Ok(())
                }
                KeyCode::Up | KeyCode::Char('k') => {
                    app.previous();
                    Ok(())
                }
                KeyCode::Char('l') => app.cycle_language(),
                KeyCode::Char('t') => app.toggle_selected(),
                KeyCode::Char('r') => app.reload(),
                _ => Ok(()),
            };

            // Errors surface in the status bar; the session keeps running
            if let Err(err) = outcome {
                warn!(error = %err, "tui action failed");
                app.status = Some(err.to_string());
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Sidebar + content
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(26), Constraint::Min(0)])
        .split(chunks[1]);

    render_sidebar(f, body[0], app);

    let view = app.page_view();
    let content = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(view.summary.len() as u16 + 2),
            Constraint::Min(0),
        ])
        .split(body[1]);

    render_summary(f, content[0], app, &view);

    if app.show_detail {
        let split = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(content[1]);
        render_table(f, split[0], app, &view);
        render_detail_panel(f, split[1], app, &view);
    } else {
        render_table(f, content[1], app, &view);
    }

    render_status_bar(f, chunks[2], app, &view);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let user = app
        .session
        .current_user()
        .map(|u| u.name.clone())
        .unwrap_or_else(|| app.data.profile.name.clone());

    let spans = vec![
        Span::styled(
            " Family Budget ",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" │ "),
        Span::styled(app.t(app.current_page.title_key()), Style::default().fg(Color::Yellow)),
        Span::raw("  |  "),
        Span::styled(format!("{}, {}", app.t("welcome"), user), Style::default().fg(Color::White)),
        Span::raw("  |  "),
        Span::styled(app.language.current().native_name(), Style::default().fg(Color::Green)),
        Span::raw("  |  "),
        Span::styled(app.today.format("%d %b %Y").to_string(), Style::default().fg(Color::DarkGray)),
    ];

    let header = Paragraph::new(vec![Line::from(spans)])
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Cyan)));
    f.render_widget(header, area);
}

fn render_sidebar(f: &mut Frame, area: Rect, app: &App) {
    let mut items = Vec::new();
    for (section, pages) in sidebar() {
        items.push(ListItem::new(Line::from(Span::styled(
            app.t(section.title_key()),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ))));
        for page in pages {
            let style = if page == app.current_page {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            let marker = if page == app.current_page { "→ " } else { "  " };
            items.push(ListItem::new(Line::from(Span::styled(
                format!("{}{}", marker, app.t(page.title_key())),
                style,
            ))));
        }
    }

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );
    f.render_widget(list, area);
}

fn render_summary(f: &mut Frame, area: Rect, app: &App, view: &PageView) {
    let lines: Vec<Line> = view
        .summary
        .iter()
        .map(|(label, value)| {
            Line::from(vec![
                Span::styled(format!("  {}: ", label), Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
                Span::styled(value.clone(), Style::default().fg(Color::White)),
            ])
        })
        .collect();

    let block = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(format!(" {} ", app.t(app.current_page.title_key()))),
    );
    f.render_widget(block, area);
}

fn render_table(f: &mut Frame, area: Rect, app: &mut App, view: &PageView) {
    let header_cells = view.headers.iter().map(|h| {
        Cell::from(*h).style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
    });
    let header = Row::new(header_cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1);

    let rows = view.rows.iter().map(|row| {
        let cells = row.iter().map(|c| Cell::from(truncate(c, 40)));
        Row::new(cells).height(1)
    });

    let cols = view.headers.len().max(1) as u16;
    let widths: Vec<Constraint> = (0..cols).map(|_| Constraint::Ratio(1, cols as u32)).collect();

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White)),
        )
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.state);
}

fn render_detail_panel(f: &mut Frame, area: Rect, app: &App, view: &PageView) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Details ");

    let Some(row) = app.state.selected().and_then(|i| view.rows.get(i)) else {
        f.render_widget(Paragraph::new("Nothing selected").block(block), area);
        return;
    };

    let mut content = vec![Line::from("")];
    for (header, value) in view.headers.iter().zip(row) {
        content.push(Line::from(vec![
            Span::styled(format!("  {}: ", header), Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
            Span::raw(value.clone()),
        ]));
        content.push(Line::from(""));
    }
    content.push(Line::from(Span::styled(
        "  Press Enter to close",
        Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
    )));

    f.render_widget(Paragraph::new(content).block(block), area);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App, view: &PageView) {
    let selected = app.state.selected().map(|i| i + 1).unwrap_or(0);

    let mut spans = vec![Span::styled(
        format!(" Row: {}/{} ", selected.min(view.rows.len()), view.rows.len()),
        Style::default().fg(Color::Cyan),
    )];
    if let Some(status) = &app.status {
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(status.clone(), Style::default().fg(Color::Green)));
    }

    for (key, label) in [
        ("Tab", " Page"),
        ("↑/↓", " Nav"),
        ("Enter", " Details"),
        ("t", " Toggle"),
        ("l", " Language"),
        ("r", " Reload"),
    ] {
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(key, Style::default().fg(Color::Yellow)));
        spans.push(Span::raw(label));
    }
    spans.push(Span::raw(" | "));
    spans.push(Span::styled("q", Style::default().fg(Color::Red)));
    spans.push(Span::raw(" Quit"));

    let bar = Paragraph::new(vec![Line::from(spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );
    f.render_widget(bar, area);
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}
