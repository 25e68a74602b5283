use crate::api::Student;
use crate::dashboard::{DashboardStats, load_dashboard};
use crate::ui::{AppContext, Screen};
use dioxus::prelude::*;

#[derive(Clone, PartialEq)]
enum DashboardLoad {
    Loading,
    Ready(DashboardStats),
    Failed,
}

#[component]
pub fn DashboardView(app: AppContext) -> Element {
    let mut load = use_signal(|| DashboardLoad::Loading);

    let mut refresh = move || {
        load.set(DashboardLoad::Loading);
        spawn(async move {
            let client = app.client();
            match load_dashboard(&client).await {
                Ok(stats) => load.set(DashboardLoad::Ready(stats)),
                Err(err) => {
                    tracing::error!(%err, "failed to load dashboard");
                    load.set(DashboardLoad::Failed);
                    app.report_api_error("Failed to load student data", &err);
                }
            }
        });
    };

    use_hook(move || refresh());

    let body = match load() {
        DashboardLoad::Loading => rsx! {
            div { class: "empty-state",
                p { class: "text-muted", "Loading dashboard..." }
            }
        },
        DashboardLoad::Failed => rsx! {
            div { class: "empty-state",
                p { class: "text-muted", "Student data is unavailable right now." }
            }
        },
        DashboardLoad::Ready(stats) => rsx! { DashboardBody { stats } },
    };

    rsx! {
        div { class: "main-container dashboard",
            div { class: "dashboard-header",
                div {
                    h1 { "Student Dashboard" }
                    p { class: "text-muted", "Overview of student records and statistics" }
                }
                div { class: "hstack",
                    button { class: "btn", r#type: "button", onclick: move |_| refresh(), "Refresh" }
                    button {
                        class: "btn",
                        r#type: "button",
                        onclick: move |_| app.navigate(Screen::Chat),
                        "Chat"
                    }
                    button {
                        class: "btn",
                        r#type: "button",
                        title: "Log out",
                        onclick: move |_| app.sign_out(),
                        "Log out"
                    }
                }
            }
            {body}
        }
    }
}

#[component]
fn DashboardBody(stats: DashboardStats) -> Element {
    let department_count = stats.departments.len();
    let bars: Vec<(String, usize, u32, u32)> = stats
        .departments
        .iter()
        .map(|(name, count)| {
            (
                name.clone(),
                *count,
                stats.bar_percent(*count),
                stats.share_percent(*count),
            )
        })
        .collect();

    rsx! {
        div { class: "stat-grid",
            StatCard { label: "Total Students", value: stats.total.to_string(), hint: "Registered students" }
            StatCard { label: "Departments", value: department_count.to_string(), hint: "Active departments" }
        }
        div { class: "card",
            h3 { class: "section-title", "Students by Department" }
            if bars.is_empty() {
                p { class: "text-muted", "No students yet." }
            }
            div { class: "bar-chart",
                for (name, count, width, share) in bars.iter().cloned() {
                    div { key: "{name}", class: "bar-row",
                        span { class: "bar-label", "{name}" }
                        div { class: "bar-track",
                            div { class: "bar-fill", style: "width: {width}%;" }
                        }
                        span { class: "bar-value", "{count} ({share}%)" }
                    }
                }
            }
        }
        div { class: "card",
            h3 { class: "section-title", "Recent Students" }
            table { class: "data-table",
                thead {
                    tr {
                        th { "ID" }
                        th { "Name" }
                        th { "Email" }
                        th { "Department" }
                    }
                }
                tbody {
                    for student in stats.recent.iter().rev().cloned() {
                        tr { key: "{student.id}",
                            td { "{student.id}" }
                            td { "{student.name}" }
                            td { "{student.email}" }
                            td { "{department_label(&student)}" }
                        }
                    }
                }
            }
        }
    }
}

fn department_label(student: &Student) -> &str {
    student.department.as_deref().unwrap_or("-")
}

#[component]
fn StatCard(label: &'static str, value: String, hint: &'static str) -> Element {
    rsx! {
        div { class: "card stat-card",
            div { class: "stat-label", "{label}" }
            div { class: "stat-value", "{value}" }
            p { class: "text-muted", "{hint}" }
        }
    }
}
