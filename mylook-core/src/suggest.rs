//! Suggestion engine
//!
//! Two-tier strategy: delegate selection to the AI stylist when a
//! credential is configured, fall back to the deterministic seasonal
//! heuristic on any stylist failure. AI-tier failures never reach the
//! caller. Each call is stateless; serializing concurrent generations is
//! the caller's concern.

use crate::ai::{StylistClient, StylistSelection, WardrobeProjection};
use crate::error::{EngineError, EngineResult};
use mylook_common::models::{
    Category, Context, HistoryEntry, OutfitPiece, OutfitSuggestion, SuggestionSource,
    WardrobeItem,
};
use mylook_common::sanitize::dedupe_by_id;
use rand::Rng;
use std::collections::HashMap;
use tracing::{debug, warn};
use uuid::Uuid;

/// Tunable selection constants.
///
/// Both values are deliberate configuration, not derived quantities: the
/// dress draw fires when a uniform [0,1) sample exceeds `dress_threshold`,
/// and outerwear is added below `outerwear_max_temp_c` (or when the
/// temperature is unknown).
#[derive(Debug, Clone, Copy)]
pub struct SuggestionParams {
    pub dress_threshold: f64,
    pub outerwear_max_temp_c: f64,
}

impl Default for SuggestionParams {
    fn default() -> Self {
        SuggestionParams {
            dress_threshold: 0.6,
            outerwear_max_temp_c: 16.0,
        }
    }
}

/// Generate an outfit suggestion for the wardrobe and context.
///
/// Preconditions: the wardrobe must be non-empty; callers short-circuit
/// the empty case before calling.
pub async fn generate_suggestion(
    wardrobe: &[WardrobeItem],
    look_type: &str,
    context: &Context,
    stylist: Option<&StylistClient>,
    params: &SuggestionParams,
) -> EngineResult<OutfitSuggestion> {
    if wardrobe.is_empty() {
        return Err(EngineError::Precondition(
            "Cannot generate a suggestion for an empty wardrobe".to_string(),
        ));
    }

    if let Some(stylist) = stylist.filter(|s| s.has_credential()) {
        match ai_tier(wardrobe, look_type, context, stylist).await {
            Ok(suggestion) => return Ok(suggestion),
            Err(e) => {
                warn!(error = %e, "AI tier failed, falling back to local heuristic");
            }
        }
    }

    Ok(fallback_suggestion(
        wardrobe,
        look_type,
        context,
        params,
        &mut rand::thread_rng(),
    ))
}

/// AI tier: one stylist round trip, ids resolved against the live wardrobe
async fn ai_tier(
    wardrobe: &[WardrobeItem],
    look_type: &str,
    context: &Context,
    stylist: &StylistClient,
) -> EngineResult<OutfitSuggestion> {
    let projection: Vec<WardrobeProjection> =
        wardrobe.iter().map(WardrobeProjection::from).collect();
    let selection = stylist.choose_outfit(&projection, look_type, context).await?;
    let outfit = resolve_selection(wardrobe, &selection);
    if outfit.is_empty() {
        return Err(EngineError::Parse(
            "Stylist selection resolved to zero wardrobe items".to_string(),
        ));
    }

    debug!(items = outfit.len(), "AI tier produced an outfit");
    Ok(OutfitSuggestion {
        look_type: look_type.to_string(),
        source: SuggestionSource::Ai,
        rationale: selection
            .reason
            .filter(|r| !r.trim().is_empty())
            .unwrap_or_else(|| "AI-generated style suggestion.".to_string()),
        outfit,
        context: context.clone(),
    })
}

/// Resolve selected ids against the wardrobe; unknown ids are silently
/// dropped, duplicates keep the first occurrence.
pub fn resolve_selection(
    wardrobe: &[WardrobeItem],
    selection: &StylistSelection,
) -> Vec<WardrobeItem> {
    let picked: Vec<WardrobeItem> = selection
        .selected_item_ids
        .iter()
        .filter_map(|id| {
            let id = Uuid::parse_str(id).ok()?;
            wardrobe.iter().find(|item| item.id == id).cloned()
        })
        .collect();
    dedupe_by_id(&picked)
}

/// Deterministic fallback tier, always available.
///
/// Selection works over the seasonal pool (items valid for the context's
/// season), partitioned by category: either one dress (random draw above
/// the threshold) or top + bottom, outerwear in cold or unknown
/// temperatures, then shoes and accessories. Empty pools contribute
/// nothing; the result may legitimately be an empty outfit.
pub fn fallback_suggestion<R: Rng>(
    wardrobe: &[WardrobeItem],
    look_type: &str,
    context: &Context,
    params: &SuggestionParams,
    rng: &mut R,
) -> OutfitSuggestion {
    // Partition the seasonal pool by category, in canonical order
    let mut pools: HashMap<Category, Vec<&WardrobeItem>> =
        Category::ALL.into_iter().map(|c| (c, Vec::new())).collect();
    for item in wardrobe.iter().filter(|item| item.fits_season(context.season)) {
        if let Some(pool) = pools.get_mut(&item.category) {
            pool.push(item);
        }
    }
    let pool = |category: Category| -> &[&WardrobeItem] {
        pools.get(&category).map(Vec::as_slice).unwrap_or(&[])
    };

    let dresses = pool(Category::Dresses);
    let mut outfit: Vec<WardrobeItem> = Vec::new();

    let use_dress = !dresses.is_empty() && rng.gen::<f64>() > params.dress_threshold;
    if use_dress {
        push_random(&mut outfit, dresses, rng);
    } else {
        push_random(&mut outfit, pool(Category::Tops), rng);
        push_random(&mut outfit, pool(Category::Bottoms), rng);
    }

    let cold_or_unknown = context
        .temperature_c
        .map(|t| t < params.outerwear_max_temp_c)
        .unwrap_or(true);
    if cold_or_unknown {
        push_random(&mut outfit, pool(Category::Outerwear), rng);
    }

    push_random(&mut outfit, pool(Category::Shoes), rng);
    push_random(&mut outfit, pool(Category::Accessories), rng);

    let outfit = dedupe_by_id(&outfit);
    let rationale = format!(
        "Generated locally for {}, {}, {}, {}.",
        look_type, context.season, context.weather, context.time_of_day
    );

    OutfitSuggestion {
        look_type: look_type.to_string(),
        source: SuggestionSource::Fallback,
        rationale,
        outfit,
        context: context.clone(),
    }
}

/// Uniform pick from the pool; an empty pool contributes nothing
fn push_random<R: Rng>(outfit: &mut Vec<WardrobeItem>, pool: &[&WardrobeItem], rng: &mut R) {
    if pool.is_empty() {
        return;
    }
    let index = rng.gen_range(0..pool.len());
    outfit.push(pool[index].clone());
}

/// Turn an accepted suggestion into a history entry.
///
/// Empty-outfit suggestions are not acceptable and yield `None`.
pub fn accept_suggestion(
    suggestion: &OutfitSuggestion,
    favorite: bool,
) -> Option<HistoryEntry> {
    if !suggestion.is_wearable() {
        return None;
    }
    Some(HistoryEntry {
        id: Uuid::new_v4(),
        accepted_at: mylook_common::time::now(),
        look_type: suggestion.look_type.clone(),
        outfit: suggestion.outfit.iter().map(OutfitPiece::from).collect(),
        context_summary: suggestion.context.summary(),
        is_favorite: favorite,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use mylook_common::models::{ImageRef, Provenance, Season, TimeOfDay, WeatherLabel};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn item(name: &str, category: Category, season: Season) -> WardrobeItem {
        WardrobeItem {
            id: Uuid::new_v4(),
            name: name.to_string(),
            category,
            style_tags: vec![],
            season,
            image: ImageRef::default(),
            is_favorite: false,
            created_at: chrono::Utc::now(),
        }
    }

    fn summer_context(temperature_c: Option<f64>) -> Context {
        Context {
            city: "Lisbon".to_string(),
            season: Season::Summer,
            weather: WeatherLabel::Clear,
            temperature_c,
            time_of_day: TimeOfDay::Day,
            source: Provenance::WeatherIp,
        }
    }

    fn params() -> SuggestionParams {
        SuggestionParams::default()
    }

    #[test]
    fn single_member_pools_always_selected() {
        // t1/b1/s1, all-season, summer at 25C: exactly those three items,
        // never outerwear (none exists)
        let wardrobe = vec![
            item("t1", Category::Tops, Season::All),
            item("b1", Category::Bottoms, Season::All),
            item("s1", Category::Shoes, Season::All),
        ];
        let context = summer_context(Some(25.0));
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let suggestion =
                fallback_suggestion(&wardrobe, "Smart Casual", &context, &params(), &mut rng);
            let names: Vec<&str> = suggestion.outfit.iter().map(|i| i.name.as_str()).collect();
            assert_eq!(names, vec!["t1", "b1", "s1"]);
            assert_eq!(suggestion.source, SuggestionSource::Fallback);
        }
    }

    #[test]
    fn outfit_respects_seasonal_pool_and_category_uniqueness() {
        let wardrobe = vec![
            item("summer-top", Category::Tops, Season::Summer),
            item("winter-top", Category::Tops, Season::Winter),
            item("all-bottom", Category::Bottoms, Season::All),
            item("winter-coat", Category::Outerwear, Season::Winter),
            item("sandals", Category::Shoes, Season::Summer),
            item("scarf", Category::Accessories, Season::Winter),
        ];
        let context = summer_context(Some(10.0));
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..50 {
            let suggestion =
                fallback_suggestion(&wardrobe, "Streetwear", &context, &params(), &mut rng);
            let mut seen = std::collections::HashSet::new();
            for picked in &suggestion.outfit {
                assert!(picked.fits_season(Season::Summer), "{} out of season", picked.name);
                assert!(seen.insert(picked.category), "duplicate category");
            }
            assert!(!suggestion.outfit.iter().any(|i| i.name == "winter-top"));
            assert!(!suggestion.outfit.iter().any(|i| i.name == "winter-coat"));
        }
    }

    #[test]
    fn outerwear_added_when_cold_or_temperature_unknown() {
        let wardrobe = vec![
            item("tee", Category::Tops, Season::All),
            item("jacket", Category::Outerwear, Season::All),
        ];
        let mut rng = StdRng::seed_from_u64(11);

        let cold = summer_context(Some(10.0));
        let s = fallback_suggestion(&wardrobe, "Casual", &cold, &params(), &mut rng);
        assert!(s.outfit.iter().any(|i| i.name == "jacket"));

        let unknown = summer_context(None);
        let s = fallback_suggestion(&wardrobe, "Casual", &unknown, &params(), &mut rng);
        assert!(s.outfit.iter().any(|i| i.name == "jacket"));

        let warm = summer_context(Some(25.0));
        let s = fallback_suggestion(&wardrobe, "Casual", &warm, &params(), &mut rng);
        assert!(!s.outfit.iter().any(|i| i.name == "jacket"));
    }

    #[test]
    fn dress_path_skips_tops_and_bottoms() {
        let wardrobe = vec![
            item("tee", Category::Tops, Season::All),
            item("jeans", Category::Bottoms, Season::All),
            item("sundress", Category::Dresses, Season::All),
        ];
        let context = summer_context(Some(25.0));
        let mut rng = StdRng::seed_from_u64(5);

        // threshold below any sample forces the dress path
        let always_dress = SuggestionParams {
            dress_threshold: -1.0,
            ..params()
        };
        let s = fallback_suggestion(&wardrobe, "Date Night", &context, &always_dress, &mut rng);
        assert!(s.outfit.iter().any(|i| i.name == "sundress"));
        assert!(!s.outfit.iter().any(|i| i.name == "tee"));
        assert!(!s.outfit.iter().any(|i| i.name == "jeans"));

        // threshold above any sample forces the top+bottom path
        let never_dress = SuggestionParams {
            dress_threshold: 1.1,
            ..params()
        };
        let s = fallback_suggestion(&wardrobe, "Date Night", &context, &never_dress, &mut rng);
        assert!(!s.outfit.iter().any(|i| i.name == "sundress"));
        assert!(s.outfit.iter().any(|i| i.name == "tee"));
        assert!(s.outfit.iter().any(|i| i.name == "jeans"));
    }

    #[test]
    fn every_category_pool_is_reachable() {
        let wardrobe: Vec<WardrobeItem> = Category::ALL
            .into_iter()
            .map(|category| item(category.as_str(), category, Season::All))
            .collect();
        let context = summer_context(Some(5.0));
        let mut rng = StdRng::seed_from_u64(9);

        // top+bottom path in the cold: everything except the dress
        let never_dress = SuggestionParams {
            dress_threshold: 1.1,
            ..params()
        };
        let s = fallback_suggestion(&wardrobe, "Casual", &context, &never_dress, &mut rng);
        let picked: std::collections::HashSet<Category> =
            s.outfit.iter().map(|i| i.category).collect();
        for category in Category::ALL {
            if category == Category::Dresses {
                assert!(!picked.contains(&category));
            } else {
                assert!(picked.contains(&category), "missing {}", category);
            }
        }

        // dress path picks from the dresses pool instead
        let always_dress = SuggestionParams {
            dress_threshold: -1.0,
            ..params()
        };
        let s = fallback_suggestion(&wardrobe, "Casual", &context, &always_dress, &mut rng);
        assert!(s.outfit.iter().any(|i| i.category == Category::Dresses));
        assert!(!s.outfit.iter().any(|i| i.category == Category::Tops));
    }

    #[test]
    fn all_pools_empty_yields_empty_non_wearable_outfit() {
        let wardrobe = vec![item("parka", Category::Outerwear, Season::Winter)];
        let context = summer_context(Some(30.0));
        let mut rng = StdRng::seed_from_u64(1);
        let s = fallback_suggestion(&wardrobe, "Formal", &context, &params(), &mut rng);
        assert!(s.outfit.is_empty());
        assert!(!s.is_wearable());
    }

    #[test]
    fn rationale_cites_look_and_context() {
        let wardrobe = vec![item("tee", Category::Tops, Season::All)];
        let context = summer_context(Some(25.0));
        let mut rng = StdRng::seed_from_u64(2);
        let s = fallback_suggestion(&wardrobe, "Business", &context, &params(), &mut rng);
        assert_eq!(s.rationale, "Generated locally for Business, summer, clear, day.");
    }

    #[test]
    fn resolve_selection_drops_unknown_ids_and_dedupes() {
        let wardrobe = vec![
            item("tee", Category::Tops, Season::All),
            item("jeans", Category::Bottoms, Season::All),
        ];
        let selection = StylistSelection {
            selected_item_ids: vec![
                wardrobe[0].id.to_string(),
                Uuid::new_v4().to_string(),
                "not-a-uuid".to_string(),
                wardrobe[0].id.to_string(),
                wardrobe[1].id.to_string(),
            ],
            reason: None,
        };
        let resolved = resolve_selection(&wardrobe, &selection);
        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[0].name, "tee");
        assert_eq!(resolved[1].name, "jeans");
    }

    #[tokio::test]
    async fn empty_wardrobe_is_a_precondition_failure() {
        let context = summer_context(Some(25.0));
        let result = generate_suggestion(&[], "Business", &context, None, &params()).await;
        assert!(matches!(result, Err(EngineError::Precondition(_))));
    }

    #[tokio::test]
    async fn no_stylist_goes_straight_to_fallback() {
        let wardrobe = vec![item("tee", Category::Tops, Season::All)];
        let context = summer_context(Some(25.0));
        let s = generate_suggestion(&wardrobe, "Business", &context, None, &params())
            .await
            .unwrap();
        assert_eq!(s.source, SuggestionSource::Fallback);
    }

    #[test]
    fn accept_rejects_empty_outfits_and_snapshots_context() {
        let context = summer_context(Some(25.0));
        let empty = OutfitSuggestion {
            look_type: "Formal".to_string(),
            source: SuggestionSource::Fallback,
            rationale: "n/a".to_string(),
            outfit: vec![],
            context: context.clone(),
        };
        assert!(accept_suggestion(&empty, true).is_none());

        let wearable = OutfitSuggestion {
            outfit: vec![item("tee", Category::Tops, Season::All)],
            ..empty
        };
        let entry = accept_suggestion(&wearable, true).unwrap();
        assert!(entry.is_favorite);
        assert_eq!(entry.look_type, "Formal");
        assert_eq!(entry.outfit.len(), 1);
        assert_eq!(entry.outfit[0].name, "tee");
        assert_eq!(entry.context_summary, "Lisbon, summer, clear, 25C, day");
    }
}
