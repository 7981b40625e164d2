//! Representation layer.
//!
//! Read side: per-entity `*View` structs assembled by `load`, embedding
//! each related row's own view at a fixed depth. Write side: `*Input`
//! structs with nested plain data, resolved bottom-up through the
//! repository's `find_*` / `insert_*` pairs, and all-`Option` `*Update`
//! structs applying per-field overwrites. Nullable columns use a double
//! `Option` in the update structs so an explicit JSON `null` clears the
//! stored value while an absent key leaves it alone.
//!
//! Concurrent identical find-or-create calls can race and leave
//! duplicate lookup rows; the schema only enforces uniqueness where
//! identity demands it (usernames, group names).

mod alarm;
mod lookup;
mod patient;
mod person;
mod resource;
mod terminal;
mod user;

pub use alarm::*;
pub use lookup::*;
pub use patient::*;
pub use person::*;
pub use resource::*;
pub use terminal::*;
pub use user::*;

use crate::db::DatabaseError;
use serde::Deserialize;

/// Deserializer for `Option<Option<T>>` update fields: wraps whatever
/// the key carries (value or `null`) in an outer `Some`, so a present
/// key is distinguishable from an absent one. Pair with
/// `#[serde(default)]` so absent keys stay `None`.
pub(crate) fn key_present<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: serde::Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// A row a foreign key points at must exist; surface a broken reference
/// as not-found for the named entity.
pub(crate) fn require<T>(
    value: Option<T>,
    entity_type: &str,
    id: &uuid::Uuid,
) -> Result<T, DatabaseError> {
    value.ok_or_else(|| DatabaseError::NotFound {
        entity_type: entity_type.into(),
        id: id.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveDateTime};
    use rusqlite::Connection;
    use uuid::Uuid;

    use super::*;
    use crate::db::repository;
    use crate::db::sqlite::open_memory_database;
    use crate::models::enums::*;
    use crate::models::*;

    fn test_db() -> Connection {
        open_memory_database().unwrap()
    }

    fn direccion_input() -> DireccionInput {
        DireccionInput {
            localidad: "Granada".into(),
            provincia: "Granada".into(),
            direccion: "Calle Real 5".into(),
            codigo_postal: "18001".into(),
        }
    }

    fn persona_input() -> PersonaInput {
        PersonaInput {
            nombre: "Carmen".into(),
            apellidos: "Lopez Ruiz".into(),
            dni: "12345678Z".into(),
            fecha_nacimiento: NaiveDate::from_ymd_opt(1941, 5, 20).unwrap(),
            sexo: Sexo::Femenino,
            telefono_fijo: Some("958000000".into()),
            telefono_movil: None,
            direccion: direccion_input(),
        }
    }

    fn terminal_input() -> TerminalInput {
        TerminalInput {
            numero_terminal: "T-0042".into(),
            modo_acceso_vivienda: "llave en conserjeria".into(),
            barreras_arquitectonicas: false,
            modelo_terminal: "NEO-3000".into(),
            fecha_tipo_situacion: None,
            titular_id: None,
            tipo_vivienda: TipoViviendaInput {
                nombre: "Piso".into(),
            },
            tipo_situacion: TipoSituacionInput {
                nombre: "Vive sola".into(),
            },
        }
    }

    fn paciente_input() -> PacienteInput {
        PacienteInput {
            tiene_ucr: false,
            numero_expediente: "EXP-001".into(),
            numero_seguridad_social: "281234567890".into(),
            prestacion_otros_servicios_sociales: true,
            observaciones_medicas: None,
            intereses_y_actividades: None,
            terminal: terminal_input(),
            persona: persona_input(),
            modalidad: TipoModalidadInput {
                nombre: "Titular".into(),
            },
        }
    }

    fn count(conn: &Connection, table: &str) -> i64 {
        conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
            row.get(0)
        })
        .unwrap()
    }

    #[test]
    fn persona_create_resolves_address_once() {
        let conn = test_db();

        let first = create_persona(&conn, &persona_input()).unwrap();

        // Second person at the same address: two persona rows, one direccion
        let mut second_input = persona_input();
        second_input.nombre = "Manuel".into();
        second_input.dni = "87654321X".into();
        let second = create_persona(&conn, &second_input).unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(first.direccion_id, second.direccion_id);
        assert_eq!(count(&conn, "personas"), 2);
        assert_eq!(count(&conn, "direcciones"), 1);
    }

    #[test]
    fn persona_view_embeds_direccion() {
        let conn = test_db();
        let persona = create_persona(&conn, &persona_input()).unwrap();
        let view = PersonaView::load(&conn, &persona).unwrap();
        assert_eq!(view.direccion.localidad, "Granada");
        assert_eq!(view.sexo, Sexo::Femenino);
    }

    #[test]
    fn persona_partial_update_keeps_absent_fields() {
        let conn = test_db();
        let persona = create_persona(&conn, &persona_input()).unwrap();

        let update = PersonaUpdate {
            telefono_movil: Some(Some("600111222".into())),
            ..Default::default()
        };
        let updated = update_persona_fields(&conn, &persona.id, &update).unwrap();

        assert_eq!(updated.telefono_movil.as_deref(), Some("600111222"));
        assert_eq!(updated.nombre, "Carmen");
        assert_eq!(updated.direccion_id, persona.direccion_id);
    }

    #[test]
    fn explicit_null_clears_nullable_field() {
        let conn = test_db();
        let persona = create_persona(&conn, &persona_input()).unwrap();
        assert_eq!(persona.telefono_fijo.as_deref(), Some("958000000"));

        let update: PersonaUpdate =
            serde_json::from_value(serde_json::json!({ "telefono_fijo": null })).unwrap();
        let updated = update_persona_fields(&conn, &persona.id, &update).unwrap();

        assert_eq!(updated.telefono_fijo, None);
        // Fields the body never mentioned keep their stored values
        assert_eq!(updated.nombre, "Carmen");
        let stored = repository::get_persona(&conn, &persona.id).unwrap().unwrap();
        assert_eq!(stored.telefono_fijo, None);
    }

    #[test]
    fn absent_key_is_not_a_null() {
        let update: PersonaUpdate =
            serde_json::from_value(serde_json::json!({ "nombre": "Maria" })).unwrap();
        assert_eq!(update.telefono_fijo, None);
        assert_eq!(update.telefono_movil, None);

        let update: PersonaUpdate =
            serde_json::from_value(serde_json::json!({ "telefono_movil": "600999888" })).unwrap();
        assert_eq!(update.telefono_movil, Some(Some("600999888".into())));
    }

    #[test]
    fn explicit_null_unlinks_terminal_titular() {
        let conn = test_db();
        let paciente = create_paciente(&conn, &paciente_input()).unwrap();

        let mut input = terminal_input();
        input.numero_terminal = "T-0100".into();
        input.titular_id = Some(paciente.id);
        let terminal = create_terminal(&conn, &input).unwrap();
        assert_eq!(terminal.titular_id, Some(paciente.id));

        let update: TerminalUpdate =
            serde_json::from_value(serde_json::json!({ "titular_id": null })).unwrap();
        let updated = update_terminal_fields(&conn, &terminal.id, &update).unwrap();

        assert_eq!(updated.titular_id, None);
        assert_eq!(updated.numero_terminal, "T-0100");
    }

    #[test]
    fn persona_update_with_new_address_relinks() {
        let conn = test_db();
        let persona = create_persona(&conn, &persona_input()).unwrap();

        let mut nueva = direccion_input();
        nueva.direccion = "Avenida Nueva 9".into();
        let update = PersonaUpdate {
            direccion: Some(nueva),
            ..Default::default()
        };
        let updated = update_persona_fields(&conn, &persona.id, &update).unwrap();

        assert_ne!(updated.direccion_id, persona.direccion_id);
        assert_eq!(count(&conn, "direcciones"), 2);
    }

    #[test]
    fn recurso_create_cascades_and_links_address() {
        let conn = test_db();
        let input = RecursoComunitarioInput {
            nombre: "CS Centro".into(),
            telefono: "958111222".into(),
            tipo: TipoRecursoInput {
                nombre: "Centro de salud".into(),
                clasificacion: ClasificacionRecursoInput {
                    nombre: "Sanitario".into(),
                },
            },
            direccion: direccion_input(),
        };
        let recurso = create_recurso_comunitario(&conn, &input).unwrap();

        let view = RecursoComunitarioView::load(&conn, &recurso).unwrap();
        assert_eq!(view.tipo.clasificacion.nombre, "Sanitario");
        assert_eq!(view.direccion.codigo_postal, "18001");
        assert_eq!(count(&conn, "clasificaciones_recurso"), 1);

        // Identical nested chain is reused, not duplicated
        create_recurso_comunitario(&conn, &input).unwrap();
        assert_eq!(count(&conn, "tipos_recurso"), 1);
        assert_eq!(count(&conn, "direcciones"), 1);
        assert_eq!(count(&conn, "recursos_comunitarios"), 2);
    }

    #[test]
    fn paciente_create_with_unseen_vivienda_creates_one_row() {
        let conn = test_db();
        let mut input = paciente_input();
        input.terminal.tipo_vivienda.nombre = "Apartment".into();

        let paciente = create_paciente(&conn, &input).unwrap();

        assert_eq!(count(&conn, "tipos_vivienda"), 1);
        let terminal = repository::get_terminal(&conn, &paciente.terminal_id)
            .unwrap()
            .unwrap();
        let vivienda = repository::get_tipo_vivienda(&conn, &terminal.tipo_vivienda_id)
            .unwrap()
            .unwrap();
        assert_eq!(vivienda.nombre, "Apartment");
    }

    #[test]
    fn paciente_repeated_payload_shares_terminal() {
        let conn = test_db();
        create_paciente(&conn, &paciente_input()).unwrap();
        create_paciente(&conn, &paciente_input()).unwrap();

        assert_eq!(count(&conn, "pacientes"), 2);
        assert_eq!(count(&conn, "terminales"), 1);
        assert_eq!(count(&conn, "personas"), 1);
    }

    #[test]
    fn paciente_view_depth() {
        let conn = test_db();
        let paciente = create_paciente(&conn, &paciente_input()).unwrap();
        let view = PacienteView::load(&conn, &paciente).unwrap();
        assert_eq!(view.persona.direccion.localidad, "Granada");
        assert_eq!(view.terminal.tipo_vivienda.nombre, "Piso");
        assert!(view.terminal.titular.is_none());
        assert_eq!(view.modalidad.nombre, "Titular");
    }

    #[test]
    fn terminal_titular_must_exist() {
        let conn = test_db();
        let mut input = terminal_input();
        input.titular_id = Some(Uuid::new_v4());
        assert!(create_terminal(&conn, &input).is_err());
    }

    #[test]
    fn terminal_view_carries_titular_summary() {
        let conn = test_db();
        let paciente = create_paciente(&conn, &paciente_input()).unwrap();

        let mut input = terminal_input();
        input.numero_terminal = "T-0099".into();
        input.titular_id = Some(paciente.id);
        let terminal = create_terminal(&conn, &input).unwrap();

        let view = TerminalView::load(&conn, &terminal).unwrap();
        let titular = view.titular.unwrap();
        assert_eq!(titular.id, paciente.id);
        assert_eq!(titular.numero_expediente, "EXP-001");
    }

    #[test]
    fn relacion_requires_existing_paciente() {
        let conn = test_db();
        let input = RelacionPacienteInput {
            nombre: "Luis".into(),
            apellidos: "Lopez".into(),
            telefono: "600111222".into(),
            tipo_relacion: "hijo".into(),
            tiene_llaves_vivienda: true,
            disponibilidad: None,
            observaciones: None,
            prioridad: 1,
            es_conviviente: false,
            tiempo_domicilio: None,
            paciente_id: Uuid::new_v4(),
        };
        assert!(create_relacion_paciente(&conn, &input).is_err());
    }

    #[test]
    fn alarma_create_and_partial_update() {
        let conn = test_db();
        let operador = create_usuario(
            &conn,
            &UsuarioInput {
                username: "operador1".into(),
                first_name: "Ana".into(),
                last_name: "Garcia".into(),
                email: "ana@example.org".into(),
                is_active: true,
            },
        )
        .unwrap();

        let input = AlarmaInput {
            estado_alarma: EstadoAlarma::Abierta,
            fecha_registro: Some(
                NaiveDateTime::parse_from_str("2024-03-01 10:00:00", "%Y-%m-%d %H:%M:%S").unwrap(),
            ),
            observaciones: Some("Pulsador activado".into()),
            resumen: None,
            tipo_alarma: TipoAlarmaInput {
                nombre: "Caida".into(),
                codigo: "EM-01".into(),
                es_dispositivo: true,
                clasificacion: ClasificacionAlarmaInput {
                    nombre: "Emergencia".into(),
                    codigo: "EM".into(),
                },
            },
            teleoperador_id: operador.id,
        };
        let alarma = create_alarma(&conn, &input).unwrap();

        // Only resumen changes; everything else keeps its stored value
        let update = AlarmaUpdate {
            resumen: Some(Some("closed".into())),
            ..Default::default()
        };
        let updated = update_alarma_fields(&conn, &alarma.id, &update).unwrap();

        assert_eq!(updated.resumen.as_deref(), Some("closed"));
        assert_eq!(updated.estado_alarma, EstadoAlarma::Abierta);
        assert_eq!(updated.fecha_registro, alarma.fecha_registro);
        assert_eq!(updated.observaciones.as_deref(), Some("Pulsador activado"));
        assert_eq!(updated.tipo_alarma_id, alarma.tipo_alarma_id);
        assert_eq!(updated.teleoperador_id, operador.id);
    }

    #[test]
    fn alarma_requires_existing_teleoperador() {
        let conn = test_db();
        let input = AlarmaInput {
            estado_alarma: EstadoAlarma::Abierta,
            fecha_registro: None,
            observaciones: None,
            resumen: None,
            tipo_alarma: TipoAlarmaInput {
                nombre: "Caida".into(),
                codigo: "EM-01".into(),
                es_dispositivo: true,
                clasificacion: ClasificacionAlarmaInput {
                    nombre: "Emergencia".into(),
                    codigo: "EM".into(),
                },
            },
            teleoperador_id: Uuid::new_v4(),
        };
        assert!(create_alarma(&conn, &input).is_err());
    }

    #[test]
    fn alarma_view_embeds_tipo_and_operador() {
        let conn = test_db();
        let operador = create_usuario(
            &conn,
            &UsuarioInput {
                username: "operador2".into(),
                first_name: "Ana".into(),
                last_name: "Garcia".into(),
                email: "ana@example.org".into(),
                is_active: true,
            },
        )
        .unwrap();
        let alarma = create_alarma(
            &conn,
            &AlarmaInput {
                estado_alarma: EstadoAlarma::EnCurso,
                fecha_registro: None,
                observaciones: None,
                resumen: None,
                tipo_alarma: TipoAlarmaInput {
                    nombre: "Caida".into(),
                    codigo: "EM-01".into(),
                    es_dispositivo: true,
                    clasificacion: ClasificacionAlarmaInput {
                        nombre: "Emergencia".into(),
                        codigo: "EM".into(),
                    },
                },
                teleoperador_id: operador.id,
            },
        )
        .unwrap();

        let view = AlarmaView::load(&conn, &alarma).unwrap();
        assert_eq!(view.tipo_alarma.clasificacion.codigo, "EM");
        assert_eq!(view.teleoperador.username, "operador2");
    }

    #[test]
    fn usuario_view_without_extension_rows() {
        let conn = test_db();
        let usuario = create_usuario(
            &conn,
            &UsuarioInput {
                username: "nuevo".into(),
                first_name: "".into(),
                last_name: "".into(),
                email: "nuevo@example.org".into(),
                is_active: true,
            },
        )
        .unwrap();

        let view = UsuarioView::load(&conn, &usuario).unwrap();
        assert_eq!(view.database_id, None);
        assert_eq!(view.imagen, None);
        assert!(view.groups.is_empty());
    }

    #[test]
    fn usuario_view_with_group_and_database_id() {
        let conn = test_db();
        let usuario = create_usuario(
            &conn,
            &UsuarioInput {
                username: "conextension".into(),
                first_name: "".into(),
                last_name: "".into(),
                email: "x@example.org".into(),
                is_active: true,
            },
        )
        .unwrap();

        let grupo = Grupo {
            id: Uuid::new_v4(),
            nombre: "teleoperadores".into(),
        };
        repository::insert_grupo(&conn, &grupo).unwrap();
        repository::add_usuario_to_grupo(&conn, &usuario.id, &grupo.id).unwrap();
        let db_id = Uuid::new_v4();
        repository::set_usuario_database_id(&conn, &usuario.id, &db_id).unwrap();

        let view = UsuarioView::load(&conn, &usuario).unwrap();
        assert_eq!(view.database_id, Some(db_id));
        assert_eq!(view.groups.len(), 1);
    }
}
