//! Owner-scoped palette operations over a [`PaletteStore`]

use crate::{
    error::{PaletteError, Result},
    normalize::PaletteNormalizer,
    session::SessionContext,
    store::{NewPalette, PaletteStore},
    tracing_config::spans,
    types::{Palette, PaletteId},
};
use std::sync::Arc;
use tracing::{debug, info, instrument, Instrument};

/// Store failures reach callers as opaque persistence errors
fn into_persistence(err: PaletteError) -> PaletteError {
    match err {
        PaletteError::Persistence(_) => err,
        other => PaletteError::persistence(other.to_string()),
    }
}

/// Saves, lists and deletes palettes for the signed-in user
#[derive(Clone)]
pub struct PaletteService {
    store: Arc<dyn PaletteStore>,
}

impl PaletteService {
    pub fn new(store: Arc<dyn PaletteStore>) -> Self {
        Self { store }
    }

    /// Persist `palette` under `name` for the session's user
    ///
    /// # Errors
    /// - `AuthenticationRequired` without a signed-in user
    /// - `InvalidPalette` for a blank name or a palette without colors
    /// - `Persistence` when the store rejects the write
    #[instrument(skip(self, session, palette), fields(colors = palette.color_count()))]
    pub async fn save_palette(
        &self,
        session: &SessionContext,
        palette: &Palette,
        name: &str,
    ) -> Result<PaletteId> {
        let user = session.require_user()?;
        let name = PaletteNormalizer::validate_for_save(palette, name)?;
        let colors = PaletteNormalizer::renormalize(palette.clone()).colors;

        let id = self
            .store
            .create(NewPalette {
                owner_id: user.id.clone(),
                owner_name: user.owner_name().to_string(),
                name,
                colors,
            })
            .instrument(spans::persistence("create", &user.id))
            .await
            .map_err(into_persistence)?;

        info!(palette_id = %id, "Palette saved");
        Ok(id)
    }

    /// The user's palettes, most recent first
    ///
    /// # Errors
    /// - `AuthenticationRequired` without a signed-in user
    /// - `Persistence` when the store cannot be read
    #[instrument(skip(self, session))]
    pub async fn list_palettes(&self, session: &SessionContext) -> Result<Vec<Palette>> {
        let user = session.require_user()?;
        let palettes = self
            .store
            .list_by_owner(&user.id)
            .instrument(spans::persistence("list", &user.id))
            .await
            .map_err(into_persistence)?;

        debug!(count = palettes.len(), "Listed palettes");
        Ok(palettes
            .into_iter()
            .map(PaletteNormalizer::renormalize)
            .collect())
    }

    /// One of the user's palettes by id
    pub async fn find_palette(
        &self,
        session: &SessionContext,
        id: &PaletteId,
    ) -> Result<Option<Palette>> {
        Ok(self
            .list_palettes(session)
            .await?
            .into_iter()
            .find(|p| p.id.as_ref() == Some(id)))
    }

    /// Delete one of the user's palettes
    ///
    /// Ids that are unknown or owned by someone else are ignored.
    ///
    /// # Errors
    /// - `AuthenticationRequired` without a signed-in user
    /// - `Persistence` when the store rejects the delete
    #[instrument(skip(self, session), fields(palette_id = %id))]
    pub async fn delete_palette(&self, session: &SessionContext, id: &PaletteId) -> Result<()> {
        if self.find_palette(session, id).await?.is_none() {
            debug!("Palette not owned by the current user, nothing to delete");
            return Ok(());
        }

        let owner_id = session.require_user()?.id.as_str();
        self.store
            .delete_by_id(id)
            .instrument(spans::persistence("delete", owner_id))
            .await
            .map_err(into_persistence)?;
        info!("Palette deleted");
        Ok(())
    }

    /// Number of palettes the user has saved
    pub async fn count_palettes(&self, session: &SessionContext) -> Result<usize> {
        Ok(self.list_palettes(session).await?.len())
    }
}
