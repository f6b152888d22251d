use anyhow::Result;
use serde_json::json;

use crate::model::{
    now_rfc3339, GeoPoint, InventoryItem, ItemStatus, Measure, Place, StorageType, Thresholds,
};
use crate::store::{collection, Store};

/// Helper function to create a listing owned by a demo farmer
fn create_listing(
    id: &str,
    name: &str,
    category: &str,
    quantity: Measure,
    price: Measure,
    farm: &str,
    pincode: &str,
) -> InventoryItem {
    let now = now_rfc3339();
    InventoryItem {
        id: id.to_string(),
        name: name.to_string(),
        category: category.to_string(),
        item_status: ItemStatus::for_quantity(quantity.value),
        quantity,
        price,
        storage: StorageType::SelfStored,
        description: None,
        farm: Some(farm.to_string()),
        pincode: Some(pincode.to_string()),
        location: None,
        image_url: None,
        ratings: Vec::new(),
        average_rating: 0.0,
        owner_id: Some(farm.to_string()),
        created_at: Some(now.clone()),
        updated_at: Some(now),
    }
}

fn create_place(id: &str, name: &str, place_type: &str, latitude: f64, longitude: f64) -> Place {
    Place {
        place_id: id.to_string(),
        name: name.to_string(),
        place_type: place_type.to_string(),
        latitude,
        longitude,
        address: None,
    }
}

/// Populate an empty store with a small demo marketplace
pub async fn load_seed_data<S: Store>(store: &S) -> Result<()> {
    load_locations(store).await?;
    load_inventory(store).await?;
    load_places(store).await?;
    load_forum_categories(store).await?;
    load_system_documents(store).await?;
    Ok(())
}

async fn load_locations<S: Store>(store: &S) -> Result<()> {
    let locations = [
        ("560001", GeoPoint::new(12.9716, 77.5946)),
        ("560034", GeoPoint::new(12.9352, 77.6245)),
        ("110001", GeoPoint::new(28.6139, 77.2090)),
        ("400001", GeoPoint::new(18.9388, 72.8354)),
    ];
    for (pincode, point) in locations {
        store
            .set(&collection("locations").doc(pincode), serde_json::to_value(point)?)
            .await?;
    }
    log::info!("Seeded {} pincode locations", locations.len());
    Ok(())
}

async fn load_inventory<S: Store>(store: &S) -> Result<()> {
    let listings = vec![
        create_listing(
            "seed-tomatoes",
            "Tomatoes",
            "Vegetables",
            Measure::new(120.0, "kg"),
            Measure::new(30.0, "INR/kg"),
            "farmer-ravi",
            "560001",
        ),
        create_listing(
            "seed-onions",
            "Onions",
            "Vegetables",
            Measure::new(200.0, "kg"),
            Measure::new(25.0, "INR/kg"),
            "farmer-ravi",
            "560034",
        ),
        create_listing(
            "seed-basmati",
            "Basmati Rice",
            "Grains",
            Measure::new(500.0, "kg"),
            Measure::new(95.0, "INR/kg"),
            "farmer-meera",
            "110001",
        ),
        create_listing(
            "seed-mangoes",
            "Alphonso Mangoes",
            "Fruits",
            Measure::new(0.0, "dozen"),
            Measure::new(600.0, "INR/dozen"),
            "farmer-meera",
            "400001",
        ),
    ];

    for listing in &listings {
        store
            .set(&collection("inventory").doc(&listing.id), serde_json::to_value(listing)?)
            .await?;
    }
    log::info!("Seeded {} inventory listings", listings.len());
    Ok(())
}

async fn load_places<S: Store>(store: &S) -> Result<()> {
    let places = [
        create_place("seed-restaurant-kr", "KR Market Canteen", "restaurant", 12.9634, 77.5775),
        create_place("seed-storage-whitefield", "Whitefield Cold Store", "cold_storage", 12.9698, 77.7500),
        create_place("seed-farm-hoskote", "Hoskote Farm", "farm", 13.0707, 77.7982),
    ];
    for place in &places {
        store
            .set(&collection("geospatial_data").doc(&place.place_id), serde_json::to_value(place)?)
            .await?;
    }
    Ok(())
}

async fn load_forum_categories<S: Store>(store: &S) -> Result<()> {
    let categories = [
        ("crops", "Crops", "Growing, harvesting and crop health"),
        ("markets", "Markets", "Prices, buyers and selling tips"),
        ("equipment", "Equipment", "Machinery, tools and repairs"),
    ];
    for (id, name, description) in categories {
        store
            .set(
                &collection("forum_categories").doc(id),
                json!({"name": name, "description": description}),
            )
            .await?;
    }
    Ok(())
}

async fn load_system_documents<S: Store>(store: &S) -> Result<()> {
    store
        .set(
            &collection("config").doc("global"),
            json!({"currency": "INR", "default_language": "en", "maintenance_mode": false}),
        )
        .await?;
    store
        .set(
            &collection("feature_flags").doc("active_flags"),
            json!({"marketplace_query": true, "offline_sync": true, "chatbot": false}),
        )
        .await?;

    let thresholds = Thresholds {
        temperature_threshold: 40.0,
        humidity_threshold: 85.0,
        soil_moisture_threshold: 60.0,
    };
    store
        .set(
            &collection("sensor_global_config").doc("thresholds"),
            serde_json::to_value(thresholds)?,
        )
        .await?;
    Ok(())
}
