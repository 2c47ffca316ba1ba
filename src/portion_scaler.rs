//! # Portion Scaler Module
//!
//! Turns an ingredient name and a serving count into a readable quantity, and
//! rescales already-quantified text and nutrition values by a serving ratio.
//!
//! Unknown names never fail: they fall through to a counted-item heuristic and
//! finally to a flat per-serving weight.

use crate::config::DEFAULT_GRAMS_PER_SERVING;
use crate::measurement_patterns::{NUTRIENT_REGEX, QUANTITY_PREFIX_REGEX};
use crate::measurement_types::{PortionBaseline, Unit};
use crate::recipe_model::Nutrition;
use tracing::{debug, trace};

use crate::measurement_types::Unit::{Cloves, Grams, Milliliters, Pieces, Slices, Stalks};

/// Per-serving baselines. Lookup order matters for substring resolution.
const PORTION_TABLE: &[(&str, PortionBaseline)] = &[
    // Vegetables
    ("番茄", PortionBaseline::new(150.0, Grams)),
    ("西红柿", PortionBaseline::new(150.0, Grams)),
    ("鸡蛋", PortionBaseline::new(2.0, Pieces)),
    ("土豆", PortionBaseline::new(200.0, Grams)),
    ("青椒", PortionBaseline::new(1.0, Pieces)),
    ("红椒", PortionBaseline::new(1.0, Pieces)),
    ("洋葱", PortionBaseline::new(100.0, Grams)),
    ("胡萝卜", PortionBaseline::new(80.0, Grams)),
    ("白萝卜", PortionBaseline::new(150.0, Grams)),
    ("白菜", PortionBaseline::new(200.0, Grams)),
    ("包菜", PortionBaseline::new(200.0, Grams)),
    ("生菜", PortionBaseline::new(100.0, Grams)),
    ("菠菜", PortionBaseline::new(100.0, Grams)),
    ("油菜", PortionBaseline::new(100.0, Grams)),
    ("西兰花", PortionBaseline::new(150.0, Grams)),
    ("菜花", PortionBaseline::new(150.0, Grams)),
    ("蒜", PortionBaseline::new(2.0, Cloves)),
    ("蒜瓣", PortionBaseline::new(2.0, Cloves)),
    ("姜", PortionBaseline::new(10.0, Grams)),
    ("生姜", PortionBaseline::new(10.0, Grams)),
    ("葱", PortionBaseline::new(1.0, Stalks)),
    ("大葱", PortionBaseline::new(1.0, Stalks)),
    ("小葱", PortionBaseline::new(2.0, Stalks)),
    ("韭菜", PortionBaseline::new(50.0, Grams)),
    ("豆角", PortionBaseline::new(150.0, Grams)),
    ("四季豆", PortionBaseline::new(150.0, Grams)),
    ("茄子", PortionBaseline::new(200.0, Grams)),
    ("黄瓜", PortionBaseline::new(1.0, Stalks)),
    ("丝瓜", PortionBaseline::new(1.0, Stalks)),
    ("冬瓜", PortionBaseline::new(200.0, Grams)),
    ("南瓜", PortionBaseline::new(200.0, Grams)),
    ("西葫芦", PortionBaseline::new(200.0, Grams)),
    ("豆腐", PortionBaseline::new(200.0, Grams)),
    ("豆干", PortionBaseline::new(100.0, Grams)),
    ("腐竹", PortionBaseline::new(50.0, Grams)),
    ("木耳", PortionBaseline::new(5.0, Grams)),
    ("香菇", PortionBaseline::new(3.0, Pieces)),
    ("金针菇", PortionBaseline::new(100.0, Grams)),
    ("平菇", PortionBaseline::new(100.0, Grams)),
    // Meat and seafood
    ("猪肉", PortionBaseline::new(150.0, Grams)),
    ("五花肉", PortionBaseline::new(150.0, Grams)),
    ("瘦肉", PortionBaseline::new(150.0, Grams)),
    ("牛肉", PortionBaseline::new(150.0, Grams)),
    ("牛腩", PortionBaseline::new(200.0, Grams)),
    ("羊肉", PortionBaseline::new(150.0, Grams)),
    ("鸡肉", PortionBaseline::new(150.0, Grams)),
    ("鸡翅", PortionBaseline::new(3.0, Pieces)),
    ("鸡腿", PortionBaseline::new(2.0, Pieces)),
    ("鸭肉", PortionBaseline::new(150.0, Grams)),
    ("排骨", PortionBaseline::new(200.0, Grams)),
    ("猪排", PortionBaseline::new(200.0, Grams)),
    ("鱼", PortionBaseline::new(200.0, Grams)),
    ("带鱼", PortionBaseline::new(250.0, Grams)),
    ("鲤鱼", PortionBaseline::new(300.0, Grams)),
    ("草鱼", PortionBaseline::new(300.0, Grams)),
    ("鲫鱼", PortionBaseline::new(250.0, Grams)),
    ("虾", PortionBaseline::new(100.0, Grams)),
    ("虾仁", PortionBaseline::new(100.0, Grams)),
    // Seasonings
    ("盐", PortionBaseline::new(3.0, Grams)),
    ("白糖", PortionBaseline::new(5.0, Grams)),
    ("红糖", PortionBaseline::new(5.0, Grams)),
    ("冰糖", PortionBaseline::new(5.0, Grams)),
    ("酱油", PortionBaseline::new(15.0, Milliliters)),
    ("生抽", PortionBaseline::new(15.0, Milliliters)),
    ("老抽", PortionBaseline::new(10.0, Milliliters)),
    ("醋", PortionBaseline::new(10.0, Milliliters)),
    ("料酒", PortionBaseline::new(10.0, Milliliters)),
    ("蚝油", PortionBaseline::new(10.0, Milliliters)),
    ("豆瓣酱", PortionBaseline::new(10.0, Grams)),
    ("郫县豆瓣", PortionBaseline::new(10.0, Grams)),
    ("番茄酱", PortionBaseline::new(15.0, Grams)),
    ("胡椒粉", PortionBaseline::new(1.0, Grams)),
    ("辣椒", PortionBaseline::new(2.0, Pieces)),
    ("干辣椒", PortionBaseline::new(5.0, Pieces)),
    ("花椒", PortionBaseline::new(1.0, Grams)),
    ("八角", PortionBaseline::new(1.0, Pieces)),
    ("桂皮", PortionBaseline::new(1.0, Grams)),
    ("香叶", PortionBaseline::new(1.0, Slices)),
    ("淀粉", PortionBaseline::new(5.0, Grams)),
    ("玉米淀粉", PortionBaseline::new(5.0, Grams)),
    ("生粉", PortionBaseline::new(5.0, Grams)),
    // Staples
    ("大米", PortionBaseline::new(100.0, Grams)),
    ("糯米", PortionBaseline::new(100.0, Grams)),
    ("面条", PortionBaseline::new(100.0, Grams)),
    ("挂面", PortionBaseline::new(100.0, Grams)),
    ("河粉", PortionBaseline::new(150.0, Grams)),
    ("意面", PortionBaseline::new(100.0, Grams)),
    ("面粉", PortionBaseline::new(100.0, Grams)),
    ("中筋面粉", PortionBaseline::new(100.0, Grams)),
    ("低筋面粉", PortionBaseline::new(100.0, Grams)),
    ("面包", PortionBaseline::new(2.0, Slices)),
    ("吐司", PortionBaseline::new(2.0, Slices)),
];

/// Ingredients counted as whole items when they have no table entry
const COUNTED_KEYWORDS: [&str; 10] = [
    "鸡蛋", "鸡翅", "鸡腿", "虾", "鱼", "番茄", "土豆", "洋葱", "豆腐", "辣椒",
];

const MEAT_TIP_KEYWORDS: [&str; 6] = ["猪肉", "牛肉", "鸡肉", "鱼", "虾", "排骨"];
const VEGETABLE_TIP_KEYWORDS: [&str; 6] = ["番茄", "土豆", "青椒", "白菜", "黄瓜", "西兰花"];

/// Look up the baseline for an ingredient
///
/// Exact name first, then the first entry whose key is contained in the name
/// or contains it.
pub fn baseline_for(name: &str) -> Option<PortionBaseline> {
    let name = name.trim();
    if name.is_empty() {
        return None;
    }

    if let Some((_, baseline)) = PORTION_TABLE.iter().find(|(key, _)| *key == name) {
        return Some(*baseline);
    }

    PORTION_TABLE
        .iter()
        .find(|(key, _)| name.contains(key) || key.contains(name))
        .map(|(key, baseline)| {
            trace!("Portion for '{}' resolved through '{}'", name, key);
            *baseline
        })
}

/// Readable quantity of `name` for `servings` people
///
/// # Arguments
///
/// * `name` - Canonical ingredient name
/// * `servings` - Number of people
///
/// # Returns
///
/// `"{name} {amount}{unit}"`, e.g. `"盐 12g"`
///
/// # Examples
///
/// ```rust
/// use whattoeat::portion_scaler::amount_for;
///
/// assert_eq!(amount_for("盐", 4), "盐 12g");
/// assert_eq!(amount_for("番茄", 7), "番茄 1.1kg");
/// ```
pub fn amount_for(name: &str, servings: u32) -> String {
    if let Some(baseline) = baseline_for(name) {
        return format!("{} {}", name, render_amount(baseline.total_for(servings), baseline.unit));
    }

    if COUNTED_KEYWORDS.iter().any(|keyword| name.contains(keyword)) {
        debug!("No portion baseline for '{}', counting whole items", name);
        return format!("{} {}{}", name, servings.max(1), Unit::Pieces.display_name());
    }

    debug!("No portion baseline for '{}', using default weight", name);
    let grams = DEFAULT_GRAMS_PER_SERVING * f64::from(servings);
    format!("{} {}", name, render_amount(grams, Unit::Grams))
}

/// Render an amount with unit promotion (g to kg, ml to L)
fn render_amount(amount: f64, unit: Unit) -> String {
    match unit {
        Grams if amount >= 1000.0 => format!("{}kg", format_one_decimal(amount / 1000.0)),
        Milliliters if amount >= 500.0 => format!("{}L", format_one_decimal(amount / 1000.0)),
        _ => format!("{}{}", format_one_decimal(amount), unit.display_name()),
    }
}

/// Round to one decimal and drop a trailing ".0"
pub fn format_one_decimal(value: f64) -> String {
    let rounded = (value * 10.0).round() / 10.0;
    if rounded.fract() == 0.0 {
        format!("{}", rounded as i64)
    } else {
        format!("{:.1}", rounded)
    }
}

/// Rescale a quantified string by `to / from`
///
/// Only the leading number changes; the rest of the text is kept verbatim.
/// Text without a leading number, or a ratio with `from == 0` or
/// `from == to`, passes through unchanged.
///
/// # Examples
///
/// ```rust
/// use whattoeat::portion_scaler::rescale;
///
/// assert_eq!(rescale("200g 土豆", 2, 4), "400g 土豆");
/// assert_eq!(rescale("适量 盐", 2, 4), "适量 盐");
/// ```
pub fn rescale(text: &str, from: u32, to: u32) -> String {
    if from == 0 || from == to {
        return text.to_string();
    }

    match QUANTITY_PREFIX_REGEX.captures(text) {
        Some(caps) => {
            let value: f64 = match caps[1].parse() {
                Ok(value) => value,
                Err(_) => return text.to_string(),
            };
            let scaled = value * f64::from(to) / f64::from(from);
            format!("{}{}{}", format_one_decimal(scaled), &caps[2], &caps[3])
        }
        None => text.to_string(),
    }
}

/// Batch form of [`rescale`]
pub fn rescale_all<S: AsRef<str>>(items: &[S], from: u32, to: u32) -> Vec<String> {
    items
        .iter()
        .map(|item| rescale(item.as_ref(), from, to))
        .collect()
}

/// Rescale nutrition values from the reference serving count to `to`
///
/// Calories are rounded to the nearest integer; protein, carbs and fat keep
/// their unit suffix.
pub fn rescale_nutrition(nutrition: &Nutrition, to: u32) -> Nutrition {
    let from = nutrition.servings;
    if from == 0 || from == to {
        return nutrition.clone();
    }

    let ratio = f64::from(to) / f64::from(from);
    Nutrition {
        calories: (f64::from(nutrition.calories) * ratio).round() as u32,
        protein: rescale_nutrient(&nutrition.protein, ratio),
        carbs: rescale_nutrient(&nutrition.carbs, ratio),
        fat: rescale_nutrient(&nutrition.fat, ratio),
        servings: to,
    }
}

fn rescale_nutrient(value: &str, ratio: f64) -> String {
    match NUTRIENT_REGEX.captures(value.trim()) {
        Some(caps) => match caps[1].parse::<f64>() {
            Ok(number) => format!("{}{}", format_one_decimal(number * ratio), &caps[2]),
            Err(_) => value.to_string(),
        },
        None => value.to_string(),
    }
}

fn nutrient_number(value: &str) -> Option<f64> {
    NUTRIENT_REGEX
        .captures(value.trim())
        .and_then(|caps| caps[1].parse().ok())
}

/// Health labels for a nutrition record
///
/// 低卡 below 200 kcal, 高蛋白 above 20 g protein, 低脂 below 10 g fat.
pub fn health_labels(nutrition: &Nutrition) -> Vec<&'static str> {
    let mut labels = Vec::new();
    if nutrition.calories < 200 {
        labels.push("低卡");
    }
    if nutrient_number(&nutrition.protein).is_some_and(|protein| protein > 20.0) {
        labels.push("高蛋白");
    }
    if nutrient_number(&nutrition.fat).is_some_and(|fat| fat < 10.0) {
        labels.push("低脂");
    }
    labels
}

/// Shopping advice for a list of ingredients and a serving count
pub fn shopping_tips<S: AsRef<str>>(ingredients: &[S], servings: u32) -> Vec<String> {
    let mentions = |keywords: &[&str]| {
        ingredients
            .iter()
            .any(|item| keywords.iter().any(|keyword| item.as_ref().contains(keyword)))
    };

    let mut tips = Vec::new();
    if mentions(&MEAT_TIP_KEYWORDS) {
        tips.push("🥩 肉类建议新鲜采购，当天食用最佳".to_string());
    }
    if mentions(&VEGETABLE_TIP_KEYWORDS) {
        tips.push("🥬 蔬菜建议当天购买，保持新鲜口感".to_string());
    }
    if servings >= 4 {
        tips.push("🛒 采购量较大，建议使用购物车或提前预订".to_string());
    }
    if ingredients.len() > 10 {
        tips.push("📋 建议按类别采购，避免遗漏".to_string());
    }
    tips
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_table_lookup() {
        assert_eq!(amount_for("盐", 4), "盐 12g");
        assert_eq!(amount_for("鸡蛋", 3), "鸡蛋 6个");
        assert_eq!(amount_for("蒜", 2), "蒜 4瓣");
    }

    #[test]
    fn test_weight_and_volume_promotion() {
        assert_eq!(amount_for("番茄", 7), "番茄 1.1kg");
        assert_eq!(amount_for("土豆", 5), "土豆 1kg");
        assert_eq!(amount_for("酱油", 2), "酱油 30ml");
        assert_eq!(amount_for("酱油", 40), "酱油 0.6L");
    }

    #[test]
    fn test_substring_lookup_uses_first_entry() {
        // "西红柿块" contains "西红柿", the first key that matches
        assert_eq!(amount_for("西红柿块", 2), "西红柿块 300g");
        // "白糖" sits before "冰糖" so "糖" resolves to it
        assert_eq!(baseline_for("糖"), Some(PortionBaseline::new(5.0, Grams)));
    }

    #[test]
    fn test_fallbacks() {
        assert_eq!(amount_for("燕麦", 2), "燕麦 300g");
        assert_eq!(amount_for("燕麦", 8), "燕麦 1.2kg");
        assert_eq!(amount_for("年糕", 0), "年糕 0g");
        assert_eq!(baseline_for("  "), None);
    }

    #[test]
    fn test_format_one_decimal() {
        assert_eq!(format_one_decimal(400.0), "400");
        assert_eq!(format_one_decimal(1.05), "1.1");
        assert_eq!(format_one_decimal(0.333), "0.3");
    }

    #[test]
    fn test_rescale() {
        assert_eq!(rescale("200g 土豆", 2, 4), "400g 土豆");
        assert_eq!(rescale("1.5 个 洋葱", 2, 3), "2.3 个 洋葱");
        assert_eq!(rescale("盐 少许", 2, 4), "盐 少许");
        assert_eq!(rescale("200g 土豆", 0, 4), "200g 土豆");
        assert_eq!(
            rescale_all(&["100g 面条", "葱 1根"], 1, 2),
            vec!["200g 面条".to_string(), "葱 1根".to_string()]
        );
    }

    #[test]
    fn test_rescale_nutrition() {
        let base = Nutrition::new(180, "12g", "8g", "11g", 2);
        let scaled = rescale_nutrition(&base, 3);
        assert_eq!(scaled.calories, 270);
        assert_eq!(scaled.protein, "18g");
        assert_eq!(scaled.carbs, "12g");
        assert_eq!(scaled.fat, "16.5g");
        assert_eq!(scaled.servings, 3);
    }

    #[test]
    fn test_health_labels() {
        let light = Nutrition::new(180, "12g", "8g", "8g", 2);
        assert_eq!(health_labels(&light), vec!["低卡", "低脂"]);

        let hearty = Nutrition::new(380, "22g", "12g", "25g", 2);
        assert_eq!(health_labels(&hearty), vec!["高蛋白"]);
    }

    #[test]
    fn test_shopping_tips() {
        let tips = shopping_tips(&["猪肉 300g", "青椒 2个"], 2);
        assert_eq!(tips.len(), 2);
        assert!(tips[0].contains("肉类"));

        let many: Vec<String> = (0..11).map(|i| format!("调料{i}")).collect();
        let tips = shopping_tips(&many, 4);
        assert_eq!(tips.len(), 2);
    }
}
