//! Server-rendered HTML for the two boards.
//!
//! Record text is escaped, except the voyage descriptions and traveller
//! information which the webhook delivers as HTML and which are inserted
//! verbatim. The raw-JSON and traveller-info dialogs are `<details>` blocks so
//! the pages work without any client-side script.

use chrono::{DateTime, Utc};
use v_htmlescape::escape;

use crate::board::LoadState;
use crate::config::Config;
use crate::normalizer::pretty_json;
use crate::records::{CountryInfo, ProcessedInvoice, TravelListing, Voyage};

const LOADING_REFRESH_SECS: u32 = 2;

pub fn render_invoices_page(state: &LoadState<Vec<ProcessedInvoice>>, config: &Config) -> String {
    let body = match state {
        LoadState::Loading => loading_block("Chargement des factures..."),
        LoadState::Failed { message } => error_block(message),
        LoadState::Ready { data, .. } if data.is_empty() => {
            empty_block("Aucune facture à afficher pour le moment.")
        }
        LoadState::Ready { data, fetched_at } => {
            let cards: String = data
                .iter()
                .enumerate()
                .map(|(index, invoice)| invoice_card(index, invoice))
                .collect();
            format!("{}<div class=\"cards\">\n{}</div>\n", fetched_line(fetched_at), cards)
        }
    };

    let nav = format!(
        r#"<nav>
  <span class="brand">The Coding Machine POC</span>
  <a href="/invoices" class="active">Factures</a>
  <a href="/travel">Voyages</a>
  <a class="button" href="{upload}" target="_blank" rel="noopener noreferrer">Formulaire d&apos;upload</a>
</nav>
"#,
        upload = escape(&config.upload_form_url),
    );

    document("Liste des Factures", matches!(state, LoadState::Loading), &nav, &body)
}

pub fn render_travel_page(state: &LoadState<TravelListing>, config: &Config) -> String {
    let (info, body) = match state {
        LoadState::Loading => (String::new(), loading_block("Chargement des voyages...")),
        LoadState::Failed { message } => (String::new(), error_block(message)),
        LoadState::Ready { data, fetched_at } => {
            let body = if data.voyages.is_empty() {
                empty_block("Aucun voyage à afficher.")
            } else {
                let cards: String = data
                    .voyages
                    .iter()
                    .map(|voyage| voyage_card(voyage, &config.travel_site_base_url))
                    .collect();
                format!("{}<div class=\"cards\">\n{}</div>\n", fetched_line(fetched_at), cards)
            };
            (country_info_panel(&data.country_info), body)
        }
    };

    let nav = r#"<nav>
  <span class="brand">POC CDV - Voyages</span>
  <a href="/travel" class="active">Voyages</a>
  <a href="/invoices">Factures</a>
</nav>
"#;
    let intro = "<p class=\"intro\">Découvrez nos voyages inspirants et les informations utiles pour chaque destination.</p>\n";

    document(
        "Inspirations de voyages",
        matches!(state, LoadState::Loading),
        nav,
        &format!("{}{}{}", intro, info, body),
    )
}

fn invoice_card(index: usize, item: &ProcessedInvoice) -> String {
    let invoice = &item.parsed;
    let currency = escape(&invoice.currency);

    let taxes = if invoice.has_taxes() {
        format!("{} <span class=\"currency\">{}</span>", escape(&invoice.taxes), currency)
    } else {
        "<span class=\"muted\">Aucune donnée</span>".to_string()
    };

    let pdf_link = item
        .file
        .as_deref()
        .map(|file| {
            format!(
                "<a class=\"button\" href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">Voir PDF</a>\n",
                escape(file)
            )
        })
        .unwrap_or_default();

    format!(
        r#"<article class="card" id="invoice-{index}">
  <header><h2>{supplier}</h2><span class="number">#{number}</span></header>
  <p><strong>Résumé:</strong> {summary}</p>
  <dl>
    <dt>Date</dt><dd>{date}</dd>
    <dt>Échéance</dt><dd>{deadline}</dd>
    <dt>Montant HT</dt><dd>{without_taxes} <span class="currency">{currency}</span></dd>
    <dt>Taxes</dt><dd>{taxes}</dd>
    <dt>Montant TTC</dt><dd class="total">{with_taxes} <span class="currency">{currency}</span></dd>
  </dl>
  <details class="raw-json">
    <summary>Voir JSON</summary>
    <pre><code>{json}</code></pre>
  </details>
  {pdf_link}</article>
"#,
        index = index,
        supplier = escape(&invoice.supplier),
        number = escape(&invoice.number),
        summary = escape(&invoice.summary),
        date = escape(&invoice.date),
        deadline = escape(&invoice.deadline),
        without_taxes = escape(&invoice.amount_without_taxes),
        with_taxes = escape(&invoice.amount_with_taxes),
        currency = currency,
        taxes = taxes,
        json = escape(&pretty_json(&item.original_json)),
        pdf_link = pdf_link,
    )
}

fn voyage_card(voyage: &Voyage, site_base_url: &str) -> String {
    let image_url = format!("{}{}", site_base_url, voyage.cover_image);
    let voyage_url = format!("{}{}", site_base_url, voyage.permalink);

    format!(
        r#"<article class="card voyage">
  <a href="{link}" target="_blank" rel="noopener noreferrer"><img src="{image}" alt="{title}"></a>
  <h2>{title}</h2>
  <div class="description">{description}</div>
  <a class="button" href="{link}" target="_blank" rel="noopener noreferrer">Voir ce voyage</a>
</article>
"#,
        link = escape(&voyage_url),
        image = escape(&image_url),
        title = escape(&voyage.title),
        description = voyage.description,
    )
}

fn country_info_panel(entries: &[CountryInfo]) -> String {
    let content = if entries.is_empty() {
        "<div>Aucune information voyageur disponible.</div>\n".to_string()
    } else {
        entries
            .iter()
            .map(|info| format!("<div class=\"country-info\" data-code=\"{}\">{}</div>\n", escape(&info.code), info.text))
            .collect()
    };

    format!(
        "<details class=\"traveller-info\">\n<summary>Informations voyageurs</summary>\n{}</details>\n",
        content
    )
}

fn loading_block(text: &str) -> String {
    format!("<div class=\"loading\"><p>{}</p></div>\n", escape(text))
}

fn error_block(message: &str) -> String {
    format!(
        "<div class=\"error\" role=\"alert\"><strong>Erreur:</strong> <span>{}</span></div>\n",
        escape(message)
    )
}

fn empty_block(text: &str) -> String {
    format!("<div class=\"empty\"><p>{}</p></div>\n", escape(text))
}

fn fetched_line(fetched_at: &DateTime<Utc>) -> String {
    format!(
        "<p class=\"fetched-at\">Mis à jour le {}</p>\n",
        fetched_at.format("%d/%m/%Y %H:%M:%S UTC")
    )
}

fn document(title: &str, auto_refresh: bool, nav: &str, body: &str) -> String {
    let refresh = if auto_refresh {
        format!("<meta http-equiv=\"refresh\" content=\"{}\">\n", LOADING_REFRESH_SECS)
    } else {
        String::new()
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="fr">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
{refresh}<title>{title}</title>
<style>{style}</style>
</head>
<body>
{nav}<main>
<h1>{title}</h1>
{body}</main>
</body>
</html>
"#,
        refresh = refresh,
        title = escape(title),
        style = STYLE,
        nav = nav,
        body = body,
    )
}

const STYLE: &str = "
body{font-family:system-ui,sans-serif;background:#f9fafb;color:#1f2937;margin:0}
nav{display:flex;gap:1rem;align-items:center;background:#fff;padding:.75rem 1.5rem;box-shadow:0 1px 3px #0002}
nav .brand{font-weight:600;margin-right:auto}
nav a.active{color:#2563eb;border-bottom:2px solid #2563eb}
main{max-width:64rem;margin:0 auto;padding:1.5rem}
.cards{display:grid;gap:1.5rem}
.card{background:#fff;border:1px solid #e5e7eb;border-radius:.5rem;padding:1.25rem}
.card header{display:flex;justify-content:space-between}
.card img{width:100%;height:14rem;object-fit:cover}
.number{font-family:monospace;background:#f3f4f6;padding:.25rem .5rem}
.muted{color:#9ca3af;font-style:italic}
.error{background:#fee2e2;border:1px solid #f87171;color:#b91c1c;padding:.75rem 1rem}
.empty,.loading{text-align:center;padding:2.5rem;color:#6b7280}
.button{display:inline-block;padding:.25rem .75rem;background:#3b82f6;color:#fff;border-radius:.25rem;text-decoration:none}
pre{background:#f3f4f6;padding:.75rem;overflow-x:auto}
.country-info{background:#eff6ff;border-left:4px solid #60a5fa;padding:1rem;margin:1rem 0}
";
