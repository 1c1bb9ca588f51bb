//! Built-in demo catalog, posted to the product service by `hh-cli seed products`.

use crate::models::ProductInput;
use crate::types::Clp;

struct SeedProduct {
    name: &'static str,
    category: &'static str,
    price: i64,
    stock: u32,
    origin: &'static str,
    image: &'static str,
    description: &'static str,
}

const CATALOG: &[SeedProduct] = &[
    SeedProduct {
        name: "Manzanas Fuji",
        category: "Frutas Frescas",
        price: 1200,
        stock: 150,
        origin: "Valle del Maule",
        image: "/static/img/products/manzanas-fuji.jpg",
        description: "Manzanas Fuji crujientes y dulces, cultivadas en el Valle del Maule. Precio por kilo.",
    },
    SeedProduct {
        name: "Naranjas Valencia",
        category: "Frutas Frescas",
        price: 1000,
        stock: 200,
        origin: "Región de Coquimbo",
        image: "/static/img/products/naranjas-valencia.jpg",
        description: "Jugosas y ricas en vitamina C, ideales para jugo natural. Precio por kilo.",
    },
    SeedProduct {
        name: "Plátanos Cavendish",
        category: "Frutas Frescas",
        price: 800,
        stock: 250,
        origin: "Ecuador",
        image: "/static/img/products/platanos-cavendish.jpg",
        description: "Plátanos maduros y dulces, perfectos para el desayuno o como colación. Precio por kilo.",
    },
    SeedProduct {
        name: "Zanahorias Orgánicas",
        category: "Verduras Orgánicas",
        price: 900,
        stock: 100,
        origin: "Región de O'Higgins",
        image: "/static/img/products/zanahorias-organicas.jpg",
        description: "Zanahorias cultivadas sin pesticidas, excelentes para ensaladas y jugos. Precio por kilo.",
    },
    SeedProduct {
        name: "Espinacas Frescas",
        category: "Verduras Orgánicas",
        price: 700,
        stock: 80,
        origin: "Región Metropolitana",
        image: "/static/img/products/espinacas-frescas.jpg",
        description: "Espinacas frescas y nutritivas, para ensaladas y preparaciones cocidas. Bolsa de 500 g.",
    },
    SeedProduct {
        name: "Pimientos Tricolores",
        category: "Verduras Orgánicas",
        price: 1500,
        stock: 120,
        origin: "Región de Valparaíso",
        image: "/static/img/products/pimientos-tricolores.jpg",
        description: "Pimientos rojos, amarillos y verdes, ricos en antioxidantes. Precio por kilo.",
    },
    SeedProduct {
        name: "Miel Orgánica",
        category: "Productos Orgánicos",
        price: 5000,
        stock: 50,
        origin: "Región del Biobío",
        image: "/static/img/products/miel-organica.jpg",
        description: "Miel pura producida por apicultores locales. Frasco de 500 g.",
    },
    SeedProduct {
        name: "Quinoa Orgánica",
        category: "Productos Orgánicos",
        price: 3500,
        stock: 8,
        origin: "Región de Tarapacá",
        image: "/static/img/products/quinoa-organica.jpg",
        description: "Quinoa altiplánica, fuente de proteína completa. Bolsa de 1 kg.",
    },
    SeedProduct {
        name: "Leche Entera",
        category: "Productos Lácteos",
        price: 1100,
        stock: 200,
        origin: "Región de Los Lagos",
        image: "/static/img/products/leche-entera.jpg",
        description: "Leche entera de vacas de pastoreo del sur de Chile. Caja de 1 litro.",
    },
];

/// The demo catalog as product bodies ready to POST.
#[must_use]
pub fn demo_catalog() -> Vec<ProductInput> {
    CATALOG
        .iter()
        .map(|p| ProductInput {
            name: p.name.to_string(),
            category: p.category.to_string(),
            price: Clp::new(p.price),
            stock: p.stock,
            description: p.description.to_string(),
            origin: p.origin.to_string(),
            image: Some(p.image.to_string()),
        })
        .collect()
}
