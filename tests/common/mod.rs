//! Shared builders for scenario tests: a small boundary pack covering two
//! regions, their departments and the arrondissements of Mfoundi.

use parcelview::ReferenceBoundaries;

fn square(lng: f64, lat: f64) -> String {
    format!(
        "[[[{lng}, {lat}], [{}, {lat}], [{}, {}], [{lng}, {}], [{lng}, {lat}]]]",
        lng + 1.0,
        lng + 1.0,
        lat + 1.0,
        lat + 1.0,
    )
}

fn feature(props: &str, lng: f64, lat: f64) -> String {
    format!(
        r#"{{"type": "Feature", "properties": {{{props}}}, "geometry": {{"type": "Polygon", "coordinates": {}}}}}"#,
        square(lng, lat)
    )
}

fn collection(features: &[String]) -> String {
    format!(
        r#"{{"type": "FeatureCollection", "features": [{}]}}"#,
        features.join(",")
    )
}

pub fn sample_boundaries() -> ReferenceBoundaries {
    let country = collection(&[feature("\"NAME_0\": \"Cameroon\"", 9.0, 2.0)]);
    let regions = collection(&[
        feature("\"NAME_1\": \"Centre\"", 11.0, 3.5),
        feature("\"NAME_1\": \"Littoral\"", 9.5, 3.8),
    ]);
    let departments = collection(&[
        feature("\"NAME_1\": \"Centre\", \"NAME_2\": \"Mfoundi\"", 11.3, 3.7),
        feature("\"NAME_1\": \"Littoral\", \"NAME_2\": \"Wouri\"", 9.6, 4.0),
    ]);
    let arrondissements = collection(&[
        feature(
            "\"NAME_2\": \"Mfoundi\", \"NAME_3\": \"Yaoundé I\"",
            11.45,
            3.85,
        ),
        feature(
            "\"NAME_2\": \"Mfoundi\", \"NAME_3\": \"Yaoundé II\"",
            11.48,
            3.88,
        ),
    ]);

    ReferenceBoundaries::from_geojson_strs(&country, &regions, &departments, &arrondissements)
        .expect("fixture boundaries parse")
}

/// A §6-shaped backend body carrying the canonical unit-square ring
pub fn backend_body() -> &'static str {
    r#"{
        "success": true,
        "results": {
            "coordinates": [[10, 6], [10, 7], [11, 7], [11, 6], [10, 6]],
            "area_value": 12500.0,
            "arrondissement_name": "Yaoundé I",
            "department_name": "Mfoundi",
            "owner_name": "Jean Mballa",
            "polygon": {
                "type": "polygon",
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[10, 6], [10, 7], [11, 7], [11, 6], [10, 6]]]
                },
                "bounds": [10.0, 6.0, 11.0, 7.0],
                "centroid": [10.5, 6.5],
                "perimeter": 4.0,
                "area": 1.0
            }
        }
    }"#
}
