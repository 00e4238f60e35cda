use crate::console::{CampaignDraft, Console, ContactDraft, Listing, Modal, PendingAction, Tab};
use crate::markup::Markup;
use crate::models::{Batch, Campaign, CampaignStats, Contact, ContactStatus, DailyStats};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::time::Instant;

const VARIABLES: [(&str, &str); 6] = [
    ("{nome}", "Nome do destinatário"),
    ("{email}", "Email do destinatário"),
    ("{empresa}", "Nome da empresa"),
    ("{cargo}", "Cargo/função"),
    ("{telefone}", "Número de telefone"),
    ("{linkedin}", "Perfil do LinkedIn"),
];

pub fn render_index(console: &Console, now: Instant) -> String {
    let panels = Markup::join(Tab::ALL, |tab| render_panel(console, tab, now));
    let modal = console.modals.top().map(render_modal).unwrap_or_default();

    Markup::fragment(INDEX_HTML, &[&render_tabs(console), &panels, &modal]).into_string()
}

fn render_tabs(console: &Console) -> Markup {
    Markup::join(Tab::ALL, |tab| {
        Markup::fragment(
            r#"<a class="tab{}" href="/tabs/{}">{}</a>"#,
            &[&active_class(console.is_active(tab)), &tab.name(), &tab.label()],
        )
    })
}

fn active_class(active: bool) -> Markup {
    if active { Markup::raw(" active") } else { Markup::new() }
}

fn render_panel(console: &Console, tab: Tab, now: Instant) -> Markup {
    let body = match tab {
        Tab::Upload => render_upload(),
        Tab::Campaigns => render_campaigns(console),
        Tab::Send => render_send(console),
        Tab::Batches => render_batches(&console.batches),
        Tab::Stats => render_stats(console.stats.as_ref()),
    };

    let alert = console
        .alert(tab, now)
        .map(|alert| {
            Markup::fragment(
                r#"<div class="alert alert-{}">{}</div>"#,
                &[&alert.kind.css(), &alert.message],
            )
        })
        .unwrap_or_default();
    let loading = Markup::when(console.is_loading(tab), || {
        Markup::raw(r#"<div class="loading">Processando...</div>"#)
    });

    Markup::fragment(
        r#"<section class="tab-content{}" id="{}"><div id="{}-alert">{}</div>{}{}</section>"#,
        &[&active_class(console.is_active(tab)), &tab.name(), &tab.name(), &alert, &loading, &body],
    )
}

fn render_upload() -> Markup {
    Markup::raw(
        r#"<h2>Importar Contatos</h2>
<form id="upload-form" method="post" action="/upload" enctype="multipart/form-data">
  <div class="form-group">
    <label for="csv-file">Arquivo CSV:</label>
    <input type="file" id="csv-file" name="file" accept=".csv">
  </div>
  <div class="form-group">
    <label for="source">Origem:</label>
    <input type="text" id="source" name="source" class="form-control" value="csv_import">
  </div>
  <button type="submit" class="btn btn-primary">📤 Importar</button>
</form>"#,
    )
}

fn render_campaigns(console: &Console) -> Markup {
    let draft = &console.campaign_draft;
    let form = Markup::fragment(
        r#"<h2>Nova Campanha</h2>
<form id="campaign-form" method="post" action="/campaigns">
  <div class="form-group">
    <label for="campaign-name">Nome da Campanha:</label>
    <input type="text" id="campaign-name" name="name" class="form-control" value="{}">
  </div>
  <div class="form-group">
    <label for="campaign-subject">Assunto do Email:</label>
    <input type="text" id="campaign-subject" name="subject" class="form-control" value="{}">
  </div>
  <div class="form-group">
    <label for="campaign-body">Corpo do Email:</label>
    <textarea id="campaign-body" name="body" class="form-control" rows="8">{}</textarea>
  </div>
  <button type="submit" class="btn btn-primary">💾 Criar Campanha</button>
</form>{}"#,
        &[&draft.name, &draft.subject, &draft.body, &render_variables()],
    );

    let list = render_listing(&console.campaigns, "Nenhuma campanha encontrada.", |campaign| {
        let id = campaign.id;
        Markup::fragment(
            r#"<div class="campaign-item">
  <div class="campaign-name">{}</div>
  <div class="campaign-details">ID: {} | Criada em: {}</div>
  <div class="campaign-actions">
    <form method="post" action="/campaigns/{}/view"><button class="btn btn-secondary">👁️ Visualizar</button></form>
    <form method="post" action="/campaigns/{}/edit"><button class="btn btn-primary">✏️ Editar</button></form>
    <form method="post" action="/campaigns/{}/delete"><button class="btn btn-danger">🗑️ Excluir</button></form>
  </div>
</div>"#,
            &[&campaign.name, &id, &format_date(&campaign.created_at), &id, &id, &id],
        )
    });

    Markup::fragment(
        r#"{}<h2>Campanhas</h2><div id="campaigns-list">{}</div>"#,
        &[&form, &list],
    )
}

fn render_send(console: &Console) -> Markup {
    let draft = &console.send_draft;
    let options = Markup::join(console.send_options.items(), |campaign: &Campaign| {
        let selected = if draft.campaign_id == Some(campaign.id) {
            Markup::raw(" selected")
        } else {
            Markup::new()
        };
        Markup::fragment(
            r#"<option value="{}"{}>{}</option>"#,
            &[&campaign.id, &selected, &campaign.name],
        )
    });
    let error = match &console.send_options {
        Listing::Failed(message) => {
            Markup::fragment(r#"<p class="list-error">{}</p>"#, &[message])
        }
        _ => Markup::new(),
    };

    Markup::fragment(
        r#"<h2>Enviar Campanha</h2>{}
<form id="send-form" method="post" action="/send">
  <div class="form-group">
    <label for="send-campaign">Campanha:</label>
    <select id="send-campaign" name="campaign_id" class="form-control">
      <option value="">Selecione uma campanha...</option>{}
    </select>
  </div>
  <div class="form-group">
    <label for="contact-limit">Limite de contatos (opcional):</label>
    <input type="number" min="1" id="contact-limit" name="contact_limit" class="form-control" value="{}">
  </div>
  <div class="form-group checkbox">
    <label><input type="checkbox" id="test-mode" name="test_mode"{}> Modo de teste</label>
    <label><input type="checkbox" id="async-mode" name="async_mode"{}> Envio assíncrono</label>
  </div>
  <button type="submit" class="btn btn-primary">🚀 Enviar Campanha</button>
</form>"#,
        &[
            &error,
            &options,
            &draft.contact_limit,
            &checked(draft.test_mode),
            &checked(draft.async_mode),
        ],
    )
}

fn checked(on: bool) -> Markup {
    if on { Markup::raw(" checked") } else { Markup::new() }
}

fn render_batches(batches: &Listing<Batch>) -> Markup {
    let list = render_listing(batches, "Nenhum lote de contatos encontrado.", |batch| {
        let active = batch.batch_status.is_active();
        let id = &batch.batch_id;
        Markup::fragment(
            r#"<div class="campaign-item">
  <div class="campaign-name">Lote {}</div>
  <div class="campaign-details">Contatos: {} | Primeira importação: {} | Última importação: {} | Status: {}</div>
  <div class="campaign-actions">
    <form method="post" action="/batches/{}/activate"><button class="btn btn-secondary"{}>{}</button></form>
    <form method="post" action="/batches/{}/deactivate"><button class="btn btn-danger"{}>{}</button></form>
    <form method="post" action="/batches/{}/contacts"><button class="btn">Ver Contatos</button></form>
  </div>
</div>"#,
            &[
                id,
                &batch.contact_count,
                &format_date(&batch.first_import),
                &format_date(&batch.last_import),
                &batch.batch_status.to_string(),
                &path_segment(id),
                &disabled(active),
                &if active { "Ativo" } else { "Ativar" },
                &path_segment(id),
                &disabled(!active),
                &if active { "Desativar" } else { "Desativado" },
                &path_segment(id),
            ],
        )
    });

    Markup::fragment(
        r#"<h2>Lotes de Contatos</h2><div id="batches-list">{}</div>"#,
        &[&list],
    )
}

fn disabled(on: bool) -> Markup {
    if on { Markup::raw(" disabled") } else { Markup::new() }
}

fn render_stats(stats: Option<&DailyStats>) -> Markup {
    let counter = |value: Option<u64>| value.map(|v| v.to_string()).unwrap_or_else(|| "-".into());
    Markup::fragment(
        r#"<h2>Estatísticas do Dia</h2>
<div class="stats-grid">
  <div class="stat-item"><div class="stat-number" id="daily-sent">{}</div><div class="stat-label">Emails enviados hoje</div></div>
  <div class="stat-item"><div class="stat-number" id="daily-limit">{}</div><div class="stat-label">Limite diário</div></div>
  <div class="stat-item"><div class="stat-number" id="total-contacts">{}</div><div class="stat-label">Contatos ativos</div></div>
  <div class="stat-item"><div class="stat-number" id="total-campaigns">{}</div><div class="stat-label">Campanhas</div></div>
</div>"#,
        &[
            &counter(stats.map(|s| s.emails_sent_today)),
            &counter(stats.map(|s| s.daily_limit)),
            &counter(stats.map(|s| s.total_contacts)),
            &counter(stats.map(|s| s.total_campaigns)),
        ],
    )
}

/// Loaded lists render one item per record, an empty list renders
/// `empty` once and a failed fetch renders its error once.
fn render_listing<T>(listing: &Listing<T>, empty: &'static str, item: impl Fn(&T) -> Markup) -> Markup {
    match listing {
        Listing::Idle => Markup::new(),
        Listing::Loaded(items) if items.is_empty() => {
            Markup::fragment(r#"<p class="empty">{}</p>"#, &[&empty])
        }
        Listing::Loaded(items) => Markup::join(items, item),
        Listing::Failed(message) => {
            Markup::fragment(r#"<p class="list-error">{}</p>"#, &[message])
        }
    }
}

fn render_modal(modal: &Modal) -> Markup {
    let content = match modal {
        Modal::CampaignView { campaign, stats } => render_campaign_view(campaign, stats.as_ref()),
        Modal::CampaignEdit { campaign, draft } => render_campaign_edit(campaign, draft),
        Modal::BatchContacts { batch_id, contacts } => render_contacts(batch_id, contacts),
        Modal::AddContact { batch_id, draft } => render_add_contact(batch_id, draft),
        Modal::Confirm(action) => render_confirm(action),
    };

    Markup::fragment(
        r#"<div class="modal" data-dismiss="modal-dismiss"><div class="modal-content">
<form id="modal-dismiss" method="post" action="/modal/dismiss"><button class="modal-close-btn" aria-label="Fechar">&times;</button></form>
{}
</div></div>"#,
        &[&content],
    )
}

fn render_campaign_view(campaign: &Campaign, stats: Option<&CampaignStats>) -> Markup {
    let stats = stats
        .map(|stats| {
            Markup::fragment(
                r#"<div class="campaign-section"><h3>📊 Estatísticas da Campanha</h3>
<div class="stats-grid">
  <div class="stat-item"><div class="stat-number">{}</div><div class="stat-label">Emails Enviados</div></div>
  <div class="stat-item"><div class="stat-number">{}</div><div class="stat-label">Entregues</div></div>
  <div class="stat-item"><div class="stat-number">{}</div><div class="stat-label">Retornados</div></div>
  <div class="stat-item"><div class="stat-number">{}</div><div class="stat-label">Abertos</div></div>
</div></div>"#,
                &[&stats.emails_sent, &stats.delivered, &stats.bounced, &stats.opened],
            )
        })
        .unwrap_or_default();

    Markup::fragment(
        r#"<h2>{}</h2>
<div class="campaign-meta"><span class="meta-item">ID: {}</span><span class="meta-item">Criada em: {}</span></div>
<div class="campaign-section"><h3>📧 Assunto do Email</h3><div class="campaign-subject">{}</div></div>
<div class="campaign-section"><h3>📝 Conteúdo do Email</h3><div class="campaign-body">{}</div></div>
{}{}
<div class="campaign-actions">
  <form method="post" action="/campaigns/{}/send-from-view"><button class="btn">🚀 Enviar Campanha</button></form>
  <form method="post" action="/modal/close"><button class="btn btn-secondary">Fechar</button></form>
</div>"#,
        &[
            &campaign.name,
            &campaign.id,
            &format_date(&campaign.created_at),
            &campaign.subject,
            &multiline(&campaign.body_template),
            &stats,
            &render_variables(),
            &campaign.id,
        ],
    )
}

fn render_campaign_edit(campaign: &Campaign, draft: &CampaignDraft) -> Markup {
    Markup::fragment(
        r#"<h2>✏️ Editar Campanha</h2>
<div class="campaign-meta"><span class="meta-item">ID: {}</span><span class="meta-item">Criada em: {}</span></div>
<form id="edit-campaign-form" method="post" action="/campaigns/{}/save">
  <div class="form-group"><label>Nome da Campanha:</label><input type="text" class="form-control" name="name" value="{}"></div>
  <div class="form-group"><label>Assunto do Email:</label><input type="text" class="form-control" name="subject" value="{}"></div>
  <div class="form-group"><label>Corpo do Email:</label><textarea class="form-control" name="body" rows="10">{}</textarea></div>
  <div class="campaign-edit-actions">
    <button type="submit" class="btn btn-primary">💾 Salvar Alterações</button>
    <button type="submit" class="btn btn-secondary" form="modal-dismiss">❌ Cancelar</button>
  </div>
</form>{}"#,
        &[
            &campaign.id,
            &format_date(&campaign.created_at),
            &campaign.id,
            &draft.name,
            &draft.subject,
            &draft.body,
            &render_variables(),
        ],
    )
}

fn render_contacts(batch_id: &str, contacts: &[Contact]) -> Markup {
    let segment = path_segment(batch_id);
    let table = if contacts.is_empty() {
        Markup::raw(r#"<p class="empty">Nenhum contato encontrado neste lote.</p>"#)
    } else {
        let rows = Markup::join(contacts, render_contact_row);
        Markup::fragment(
            r#"<table><tr><th>ID</th><th>Nome</th><th>Email</th><th>Empresa</th><th>Status</th><th>Ações</th></tr>{}</table>"#,
            &[&rows],
        )
    };

    Markup::fragment(
        r#"<h3>Contatos do Lote {}</h3>
<form method="post" action="/batches/{}/contacts/new"><button class="btn btn-primary">➕ Adicionar Contato</button></form>
{}
<form method="post" action="/modal/close"><button class="btn btn-secondary">Fechar</button></form>"#,
        &[&batch_id, &segment, &table],
    )
}

fn render_contact_row(contact: &Contact) -> Markup {
    let id = contact.id;
    let status_button = |status: ContactStatus, class: &'static str, label: &'static str| {
        Markup::when(contact.status != status, || {
            Markup::fragment(
                r#"<form method="post" action="/contacts/{}/status"><input type="hidden" name="status" value="{}"><button class="btn {}">{}</button></form>"#,
                &[&id, &status.as_str(), &class, &label],
            )
        })
    };

    Markup::fragment(
        r#"<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}{}<form method="post" action="/contacts/{}/delete"><button class="btn btn-danger">Excluir</button></form></td></tr>"#,
        &[
            &id,
            &contact.name.as_deref().unwrap_or("-"),
            &contact.email,
            &contact.company.as_deref().unwrap_or("-"),
            &contact.status.as_str(),
            &status_button(ContactStatus::Active, "btn-secondary", "Ativo"),
            &status_button(ContactStatus::Inactive, "btn-warning", "Inativo"),
            &id,
        ],
    )
}

fn render_add_contact(batch_id: &str, draft: &ContactDraft) -> Markup {
    Markup::fragment(
        r#"<h2>➕ Adicionar Contato ao Lote {}</h2>
<form id="add-contact-form" method="post" action="/batches/{}/contacts/add">
  <div class="form-group"><label for="contact-email">Email *:</label><input type="email" id="contact-email" name="email" class="form-control" value="{}"></div>
  <div class="form-group"><label for="contact-name">Nome:</label><input type="text" id="contact-name" name="name" class="form-control" value="{}"></div>
  <div class="form-group"><label for="contact-company">Empresa:</label><input type="text" id="contact-company" name="company" class="form-control" value="{}"></div>
  <div class="form-group"><label for="contact-position">Cargo:</label><input type="text" id="contact-position" name="position" class="form-control" value="{}"></div>
  <div class="form-group"><label for="contact-source">Origem:</label><input type="text" id="contact-source" name="source" class="form-control" value="{}" placeholder="Ex: LinkedIn, Site, etc."></div>
  <div class="form-actions">
    <button type="submit" class="btn btn-primary">💾 Adicionar Contato</button>
    <button type="submit" class="btn btn-secondary" form="modal-dismiss">❌ Cancelar</button>
  </div>
</form>"#,
        &[
            &batch_id,
            &path_segment(batch_id),
            &draft.email,
            &draft.name,
            &draft.company,
            &draft.position,
            &draft.source,
        ],
    )
}

fn render_confirm(action: &PendingAction) -> Markup {
    Markup::fragment(
        r#"<p class="confirm-prompt">{}</p>
<div class="form-actions">
  <form method="post" action="/confirm"><button class="btn btn-danger">Confirmar</button></form>
  <form method="post" action="/confirm/cancel"><button class="btn btn-secondary">Cancelar</button></form>
</div>"#,
        &[&action.prompt()],
    )
}

fn render_variables() -> Markup {
    let items = Markup::join(VARIABLES, |(name, label)| {
        Markup::fragment("<li><code>{}</code> - {}</li>", &[&name, &label])
    });
    Markup::fragment(
        r#"<div class="campaign-section"><h3>🔧 Variáveis Disponíveis</h3>
<div class="variables-info"><p>Use estas variáveis no assunto e corpo do email para personalização:</p><ul>{}</ul></div></div>"#,
        &[&items],
    )
}

fn multiline(text: &str) -> Markup {
    let mut out = Markup::new();
    for (index, line) in text.lines().enumerate() {
        if index > 0 {
            out.push_raw("<br>");
        }
        out.push(&line);
    }
    out
}

/// Percent-encodes a value for use as one path segment of a console URL.
fn path_segment(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

/// Formats backend timestamps as `dd/mm/yyyy`; unknown shapes are shown as-is.
pub fn format_date(raw: &str) -> String {
    const DAY: &str = "%d/%m/%Y";
    let raw = raw.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return parsed.format(DAY).to_string();
    }
    for pattern in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, pattern) {
            return parsed.format(DAY).to_string();
        }
    }
    if let Ok(parsed) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return parsed.format(DAY).to_string();
    }
    raw.to_string()
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="pt-BR">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Cold Email Console</title>
  <style>
    :root {
      --bg-1: #f8f3e6;
      --ink: #2b2a28;
      --accent: #ff6b4a;
      --accent-2: #2f4858;
      --card: rgba(255, 255, 255, 0.92);
      --shadow: 0 24px 60px rgba(47, 72, 88, 0.18);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: linear-gradient(135deg, var(--bg-1), #ffe9d4 60%, #f9f2e9 100%);
      color: var(--ink);
      font-family: "Space Grotesk", "Trebuchet MS", sans-serif;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(960px, 100%);
      margin: 0 auto;
      background: var(--card);
      border-radius: 28px;
      box-shadow: var(--shadow);
      padding: 36px;
      display: grid;
      gap: 24px;
    }

    h1 {
      font-family: "Fraunces", "Georgia", serif;
      margin: 0;
    }

    .tabs {
      display: flex;
      flex-wrap: wrap;
      gap: 6px;
      padding: 6px;
      background: rgba(47, 72, 88, 0.08);
      border-radius: 999px;
    }

    .tab {
      border-radius: 999px;
      padding: 8px 14px;
      font-weight: 600;
      color: #6b645d;
      text-decoration: none;
    }

    .tab.active {
      background: white;
      color: var(--accent-2);
      box-shadow: 0 8px 16px rgba(47, 72, 88, 0.12);
    }

    .tab-content {
      display: none;
    }

    .tab-content.active {
      display: block;
    }

    .form-group {
      display: grid;
      gap: 6px;
      margin-bottom: 14px;
    }

    .form-control {
      padding: 10px 12px;
      border-radius: 12px;
      border: 1px solid rgba(47, 72, 88, 0.2);
      font: inherit;
    }

    .btn {
      border: none;
      border-radius: 999px;
      padding: 10px 16px;
      font-weight: 600;
      cursor: pointer;
      background: var(--accent-2);
      color: white;
    }

    .btn-primary { background: var(--accent); }
    .btn-secondary { background: #6b7f8c; }
    .btn-warning { background: #d99a1e; }
    .btn-danger { background: #c63b2b; }
    .btn:disabled { opacity: 0.5; cursor: default; }

    .campaign-item {
      background: white;
      border-radius: 18px;
      padding: 16px;
      margin-bottom: 12px;
      border: 1px solid rgba(47, 72, 88, 0.08);
    }

    .campaign-name { font-weight: 600; font-size: 1.1rem; }
    .campaign-details { color: #6f6a65; margin: 6px 0 10px; }
    .campaign-actions, .form-actions { display: flex; flex-wrap: wrap; gap: 8px; }

    .alert { padding: 12px 16px; border-radius: 12px; margin-bottom: 12px; }
    .alert-success { background: #e3f4e8; color: #2d7a4b; }
    .alert-error { background: #fbe4e1; color: #c63b2b; }
    .loading { color: #6b645d; margin-bottom: 12px; }
    .list-error { color: #c63b2b; }

    .stats-grid {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(160px, 1fr));
      gap: 16px;
    }

    .stat-item {
      background: white;
      border-radius: 18px;
      padding: 18px;
      border: 1px solid rgba(47, 72, 88, 0.08);
    }

    .stat-number { font-size: 1.7rem; font-weight: 600; color: var(--accent-2); }
    .stat-label { font-size: 0.85rem; text-transform: uppercase; letter-spacing: 0.12em; color: #8b857d; }

    .modal {
      position: fixed;
      inset: 0;
      background: rgba(43, 42, 40, 0.55);
      display: grid;
      place-items: center;
      padding: 24px;
    }

    .modal-content {
      background: white;
      border-radius: 24px;
      padding: 28px;
      width: min(820px, 100%);
      max-height: 90vh;
      overflow: auto;
      position: relative;
    }

    .modal-close-btn {
      position: absolute;
      top: 14px;
      right: 18px;
      border: none;
      background: none;
      font-size: 1.6rem;
      cursor: pointer;
    }

    table { width: 100%; border-collapse: collapse; margin: 16px 0; }
    th, td { text-align: left; padding: 8px; border-bottom: 1px solid rgba(47, 72, 88, 0.1); }
    td form { display: inline; }
  </style>
</head>
<body>
  <main class="app">
    <header>
      <h1>📧 Cold Email Console</h1>
    </header>
    <nav class="tabs">{}</nav>
    {}
  </main>
  {}
  <script>
    const dismiss = () => {
      const form = document.getElementById('modal-dismiss');
      if (form) {
        form.submit();
      }
    };

    document.addEventListener('keydown', (event) => {
      if (event.key === 'Escape') {
        dismiss();
      }
    });

    const overlay = document.querySelector('.modal');
    if (overlay) {
      overlay.addEventListener('click', (event) => {
        if (event.target === overlay) {
          dismiss();
        }
      });
    }
  </script>
</body>
</html>
"#;
