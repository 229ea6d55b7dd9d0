pub mod api;
pub mod board;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod normalizer;
pub mod pages;
pub mod records;

use std::sync::Arc;
use board::Board;
use config::Config;
use records::{ProcessedInvoice, TravelListing};

pub type InvoiceBoard = Board<Vec<ProcessedInvoice>>;
pub type TravelBoard = Board<TravelListing>;

/// Application state that will be shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub invoices: InvoiceBoard,
    pub travel: TravelBoard,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let invoices = Board::new(
            "invoices",
            config.invoice_webhook_url.clone(),
            normalizer::normalize_invoices,
            "Impossible de charger les factures. Vérifiez la réponse du webhook et le parsing des données JSON.",
        );
        let travel = Board::new(
            "travel",
            config.travel_webhook_url.clone(),
            normalizer::normalize_travel,
            "Erreur lors du chargement des voyages.",
        );

        AppState {
            config: Arc::new(config),
            invoices,
            travel,
        }
    }

    /// Kicks off the initial fetch of every board.
    pub fn start_loading(&self) {
        self.invoices.spawn_refresh();
        self.travel.spawn_refresh();
    }
}
