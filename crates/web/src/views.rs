//! Server-rendered HTML pages

use crate::enrich::Indicators;
use axum::{http::StatusCode, response::Html};
use serde_json::Value;
use usina_core::UserProfile;
use usina_core::status::{format_date, status_class, status_icon, status_label};

const NAV: [(&str, &str, &str); 5] = [
    ("menu", "/menu", "Menu"),
    ("cadastro", "/cadastro", "Cadastro de Peças"),
    ("atividades", "/atividades", "Atividades"),
    ("producao", "/producao", "Produção"),
    ("indicadores", "/indicadores", "Indicadores"),
];

/// Escape HTML special characters to prevent XSS attacks.
pub fn html_escape(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}

fn document(title: &str, header: &str, body: &str) -> Html<String> {
    let title = html_escape(title);
    Html(format!(
        r#"<!DOCTYPE html>
<html lang="pt-BR">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <link rel="stylesheet" href="https://cdn.jsdelivr.net/npm/bootstrap@5.3.3/dist/css/bootstrap.min.css">
    <link rel="stylesheet" href="https://cdnjs.cloudflare.com/ajax/libs/font-awesome/6.5.1/css/all.min.css">
    <link rel="stylesheet" href="/public/css/style.css">
</head>
<body>
{header}
<main class="container py-4">
{body}
</main>
<footer class="text-center text-muted py-3">UsinaSoft</footer>
</body>
</html>"#
    ))
}

/// Page with the navigation bar of a logged-in user
fn layout(title: &str, user: &UserProfile, current: &str, body: &str) -> Html<String> {
    let links: String = NAV
        .iter()
        .map(|(page, href, label)| {
            let active = if *page == current { " active" } else { "" };
            format!(r#"<li class="nav-item"><a class="nav-link{active}" href="{href}">{label}</a></li>"#)
        })
        .collect();

    let header = format!(
        r#"<nav class="navbar navbar-expand navbar-dark bg-dark px-3">
    <a class="navbar-brand" href="/menu">UsinaSoft</a>
    <ul class="navbar-nav me-auto">{links}</ul>
    <span class="navbar-text me-3">{name}</span>
    <a class="btn btn-outline-light btn-sm" href="/logout">Sair</a>
</nav>"#,
        name = html_escape(&user.display_name()),
    );

    document(title, &header, body)
}

fn alert(kind: &str, message: Option<&str>) -> String {
    match message {
        Some(message) if !message.is_empty() => format!(
            r#"<div class="alert alert-{kind}" role="alert">{}</div>"#,
            html_escape(message)
        ),
        _ => String::new(),
    }
}

fn badge(status: &str) -> String {
    format!(
        r#"<span class="badge {}"><i class="{}"></i> {}</span>"#,
        status_class(status),
        status_icon(status),
        html_escape(&status_label(status))
    )
}

/// Text of a JSON field for a table cell
fn cell(item: &Value, field: &str) -> String {
    match item.get(field) {
        Some(Value::String(s)) if !s.is_empty() => html_escape(s),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => (if *b { "Sim" } else { "Não" }).to_string(),
        _ => "-".to_string(),
    }
}

fn status_of(item: &Value) -> &str {
    item.get("status").and_then(Value::as_str).unwrap_or_default()
}

pub fn login_page(error: Option<&str>, success: Option<&str>) -> Html<String> {
    let body = format!(
        r#"<div class="row justify-content-center"><div class="col-md-5">
<h1 class="h3 mb-4">Login</h1>
{error}{success}
<form method="post" action="/login">
    <div class="mb-3"><label class="form-label" for="email">Email</label>
        <input class="form-control" type="email" id="email" name="email" required></div>
    <div class="mb-3"><label class="form-label" for="password">Senha</label>
        <input class="form-control" type="password" id="password" name="password" required></div>
    <button class="btn btn-primary w-100" type="submit">Entrar</button>
</form>
<p class="mt-3 text-center"><a href="/cadastro-usuario">Criar conta</a></p>
</div></div>"#,
        error = alert("danger", error),
        success = alert("success", success),
    );
    document("Login - UsinaSoft", "", &body)
}

pub fn registration_page(error: Option<&str>) -> Html<String> {
    let body = format!(
        r#"<div class="row justify-content-center"><div class="col-md-7">
<h1 class="h3 mb-4">Cadastro de Usuário</h1>
{error}
<form method="post" action="/cadastro-usuario">
    <div class="mb-3"><label class="form-label" for="nome">Nome completo *</label>
        <input class="form-control" id="nome" name="nome" required></div>
    <div class="mb-3"><label class="form-label" for="email">Email *</label>
        <input class="form-control" type="email" id="email" name="email" required></div>
    <div class="row">
        <div class="col mb-3"><label class="form-label" for="senha">Senha *</label>
            <input class="form-control" type="password" id="senha" name="senha" minlength="6" required></div>
        <div class="col mb-3"><label class="form-label" for="confirmarSenha">Confirmar senha *</label>
            <input class="form-control" type="password" id="confirmarSenha" name="confirmarSenha" required></div>
    </div>
    <div class="mb-3"><label class="form-label" for="telefone">Telefone</label>
        <input class="form-control" id="telefone" name="telefone"></div>
    <div class="mb-3"><label class="form-label" for="cargo">Cargo *</label>
        <input class="form-control" id="cargo" name="cargo" required></div>
    <div class="mb-3"><label class="form-label" for="empresa">Empresa</label>
        <input class="form-control" id="empresa" name="empresa"></div>
    <div class="form-check mb-3">
        <input class="form-check-input" type="checkbox" id="aceitarTermos" name="aceitarTermos" value="on">
        <label class="form-check-label" for="aceitarTermos">Aceito os termos de uso</label>
    </div>
    <button class="btn btn-primary w-100" type="submit">Criar conta</button>
</form>
<p class="mt-3 text-center"><a href="/login">Já tenho conta</a></p>
</div></div>"#,
        error = alert("danger", error),
    );
    document("Cadastro de Usuário - UsinaSoft", "", &body)
}

pub fn menu_page(user: &UserProfile) -> Html<String> {
    let cards: String = NAV
        .iter()
        .skip(1)
        .map(|(_, href, label)| {
            format!(
                r#"<div class="col-md-3 mb-3"><a class="card card-body text-center text-decoration-none" href="{href}">{label}</a></div>"#
            )
        })
        .collect();
    let body = format!(
        r#"<h1 class="h3 mb-4">Bem-vindo, {name}</h1>
<div class="row">{cards}</div>"#,
        name = html_escape(&user.display_name()),
    );
    layout("Menu Principal - UsinaSoft", user, "menu", &body)
}

pub fn parts_page(user: &UserProfile, success: bool, error: Option<&str>) -> Html<String> {
    let success = success.then_some("Peça cadastrada com sucesso!");
    let body = format!(
        r#"<h1 class="h3 mb-4">Cadastro de Peças</h1>
{error}{success}
<form method="post" action="/cadastro">
    <div class="row">
        <div class="col-md-6 mb-3"><label class="form-label" for="cliente">Cliente *</label>
            <input class="form-control" id="cliente" name="cliente" required></div>
        <div class="col-md-6 mb-3"><label class="form-label" for="numeroPedido">Número do pedido *</label>
            <input class="form-control" id="numeroPedido" name="numeroPedido" required></div>
    </div>
    <div class="row">
        <div class="col-md-4 mb-3"><label class="form-label" for="codigoPeca">Código da peça *</label>
            <input class="form-control" id="codigoPeca" name="codigoPeca" required></div>
        <div class="col-md-4 mb-3"><label class="form-label" for="quantidade">Quantidade *</label>
            <input class="form-control" type="number" min="1" id="quantidade" name="quantidade" required></div>
        <div class="col-md-4 mb-3"><label class="form-label" for="dataEntrega">Data de entrega *</label>
            <input class="form-control" type="date" id="dataEntrega" name="dataEntrega" required></div>
    </div>
    <div class="mb-3"><label class="form-label" for="prioridade">Prioridade</label>
        <select class="form-select" id="prioridade" name="prioridade">
            <option value="normal">Normal</option><option value="alta">Alta</option><option value="urgente">Urgente</option>
        </select></div>
    <div class="mb-3"><label class="form-label" for="observacoes">Observações</label>
        <textarea class="form-control" id="observacoes" name="observacoes" rows="3"></textarea></div>
    <button class="btn btn-primary" type="submit">Cadastrar</button>
</form>"#,
        error = alert("danger", error),
        success = alert("success", success),
    );
    layout("Cadastro de Peças - UsinaSoft", user, "cadastro", &body)
}

fn empty_row(columns: usize, message: &str) -> String {
    format!(r#"<tr><td colspan="{columns}" class="text-center text-muted">{message}</td></tr>"#)
}

pub fn activities_page(user: &UserProfile, activities: &[Value], error: Option<&str>) -> Html<String> {
    let rows: String = if activities.is_empty() {
        empty_row(6, "Nenhuma atividade encontrada")
    } else {
        activities
            .iter()
            .map(|activity| {
                format!(
                    "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                    cell(activity, "id"),
                    cell(activity, "descricao"),
                    cell(activity, "responsavel_nome"),
                    badge(status_of(activity)),
                    cell(activity, "data_inicio_formatada"),
                    cell(activity, "data_fim_formatada"),
                )
            })
            .collect()
    };

    let body = format!(
        r#"<h1 class="h3 mb-4">Controle de Atividades</h1>
{error}
<table class="table table-striped">
<thead><tr><th>#</th><th>Descrição</th><th>Responsável</th><th>Status</th><th>Início</th><th>Fim</th></tr></thead>
<tbody>{rows}</tbody>
</table>"#,
        error = alert("danger", error),
    );
    layout("Controle de Atividades - UsinaSoft", user, "atividades", &body)
}

pub fn production_page(user: &UserProfile, orders: &[Value], error: Option<&str>) -> Html<String> {
    let rows: String = if orders.is_empty() {
        empty_row(6, "Nenhuma ordem de produção encontrada")
    } else {
        orders
            .iter()
            .map(|order| {
                let delivery = order
                    .get("data_entrega")
                    .and_then(Value::as_str)
                    .map(format_date)
                    .unwrap_or_else(|| "N/A".to_string());
                format!(
                    "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                    cell(order, "numero"),
                    cell(order, "cliente"),
                    cell(order, "quantidade"),
                    badge(status_of(order)),
                    cell(order, "criado_por_nome"),
                    html_escape(&delivery),
                )
            })
            .collect()
    };

    let body = format!(
        r#"<h1 class="h3 mb-4">Controle de Produção</h1>
{error}
<table class="table table-striped">
<thead><tr><th>OP</th><th>Cliente</th><th>Quantidade</th><th>Status</th><th>Criado por</th><th>Entrega</th></tr></thead>
<tbody>{rows}</tbody>
</table>"#,
        error = alert("danger", error),
    );
    layout("Controle de Produção - UsinaSoft", user, "producao", &body)
}

pub fn indicators_page(
    user: &UserProfile,
    indicators: &Indicators,
    error: Option<&str>,
) -> Html<String> {
    let card = |label: &str, value: usize, class: &str| {
        format!(
            r#"<div class="col-md-4 mb-3"><div class="card text-center {class}"><div class="card-body">
<div class="display-5">{value}</div><div>{label}</div></div></div></div>"#
        )
    };
    let body = format!(
        r#"<h1 class="h3 mb-4">Indicadores</h1>
{error}
<div class="row">{}{}{}</div>"#,
        card("Em fila", indicators.em_fila, "border-warning"),
        card("Em andamento", indicators.em_andamento, "border-info"),
        card("Concluídas", indicators.concluidas, "border-success"),
        error = alert("danger", error),
    );
    layout("Indicadores - UsinaSoft", user, "indicadores", &body)
}

pub fn error_page(status: StatusCode, message: &str) -> Html<String> {
    let body = format!(
        r#"<h1 class="h3 mb-3">Erro {}</h1>
{}
<a class="btn btn-secondary" href="/menu">Voltar ao menu</a>"#,
        status.as_u16(),
        alert("danger", Some(message)),
    );
    document("Erro - UsinaSoft", "", &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_html_escape() {
        assert_eq!(
            html_escape(r#"<script>alert("x")</script>"#),
            "&lt;script&gt;alert(&quot;x&quot;)&lt;/script&gt;"
        );
        assert_eq!(html_escape("Peças & Cia"), "Peças &amp; Cia");
    }

    #[test]
    fn test_login_page_shows_messages_escaped() {
        let Html(page) = login_page(Some("<b>falhou</b>"), None);
        assert!(page.contains("&lt;b&gt;falhou&lt;/b&gt;"));
        assert!(!page.contains("alert-success"));
    }

    #[test]
    fn test_production_rows() {
        let user = UserProfile::minimal(Some(1), "a@x.com");
        let orders = vec![json!({
            "numero": "OP-7",
            "cliente": "ACME",
            "quantidade": 5,
            "status": "em_andamento",
            "criado_por_nome": "Ana Silva",
            "data_entrega": "2024-06-01"
        })];

        let Html(page) = production_page(&user, &orders, None);
        assert!(page.contains("OP-7"));
        assert!(page.contains("Em Andamento"));
        assert!(page.contains("01/06/2024"));
        assert!(page.contains("Ana Silva"));
    }

    #[test]
    fn test_empty_list_with_banner() {
        let user = UserProfile::minimal(None, "a@x.com");
        let Html(page) = activities_page(&user, &[], Some("Erro ao carregar atividades."));
        assert!(page.contains("Nenhuma atividade encontrada"));
        assert!(page.contains("alert-danger"));
    }
}
