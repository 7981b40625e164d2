//! Repository layer — entity-scoped database operations.
//!
//! Each entity exposes `insert_* / get_* / list_* / update_* / delete_*`
//! plus, where the write-resolution cascade needs it, a pure `find_*`
//! exact-match lookup returning `Option`. Find and insert are kept as
//! separate operations; the get-or-create composition lives in
//! `crate::views` where the race between concurrent identical writes is
//! documented.

mod address;
mod alarm;
mod lookup;
mod patient;
mod person;
mod resource;
mod terminal;
mod user;

pub use address::*;
pub use alarm::*;
pub use lookup::*;
pub use patient::*;
pub use person::*;
pub use resource::*;
pub use terminal::*;
pub use user::*;

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveDateTime};
    use rusqlite::Connection;
    use uuid::Uuid;

    use super::*;
    use crate::db::sqlite::open_memory_database;
    use crate::models::enums::*;
    use crate::models::*;

    fn test_db() -> Connection {
        open_memory_database().unwrap()
    }

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn make_direccion(conn: &Connection) -> Direccion {
        let dir = Direccion {
            id: Uuid::new_v4(),
            localidad: "Springfield".into(),
            provincia: "X".into(),
            direccion: "123 Main St".into(),
            codigo_postal: "00000".into(),
        };
        insert_direccion(conn, &dir).unwrap();
        dir
    }

    fn make_persona(conn: &Connection) -> Persona {
        let dir = make_direccion(conn);
        let persona = Persona {
            id: Uuid::new_v4(),
            nombre: "Carmen".into(),
            apellidos: "Lopez Ruiz".into(),
            dni: "12345678Z".into(),
            fecha_nacimiento: NaiveDate::from_ymd_opt(1941, 5, 20).unwrap(),
            sexo: Sexo::Femenino,
            telefono_fijo: Some("912345678".into()),
            telefono_movil: None,
            direccion_id: dir.id,
        };
        insert_persona(conn, &persona).unwrap();
        persona
    }

    fn make_terminal(conn: &Connection) -> Terminal {
        let vivienda = TipoVivienda {
            id: Uuid::new_v4(),
            nombre: "Piso".into(),
        };
        insert_tipo_vivienda(conn, &vivienda).unwrap();
        let situacion = TipoSituacion {
            id: Uuid::new_v4(),
            nombre: "Vive sola".into(),
        };
        insert_tipo_situacion(conn, &situacion).unwrap();

        let terminal = Terminal {
            id: Uuid::new_v4(),
            numero_terminal: "T-0042".into(),
            modo_acceso_vivienda: "llave en conserjeria".into(),
            barreras_arquitectonicas: true,
            modelo_terminal: "NEO-3000".into(),
            fecha_tipo_situacion: Some(NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()),
            titular_id: None,
            tipo_vivienda_id: vivienda.id,
            tipo_situacion_id: situacion.id,
        };
        insert_terminal(conn, &terminal).unwrap();
        terminal
    }

    fn make_paciente(conn: &Connection) -> Paciente {
        let terminal = make_terminal(conn);
        let persona = make_persona(conn);
        let modalidad = TipoModalidadPaciente {
            id: Uuid::new_v4(),
            nombre: "Titular".into(),
        };
        insert_tipo_modalidad(conn, &modalidad).unwrap();

        let paciente = Paciente {
            id: Uuid::new_v4(),
            tiene_ucr: false,
            numero_expediente: "EXP-001".into(),
            numero_seguridad_social: "281234567890".into(),
            prestacion_otros_servicios_sociales: true,
            observaciones_medicas: Some("Diabetes tipo 2".into()),
            intereses_y_actividades: None,
            terminal_id: terminal.id,
            persona_id: persona.id,
            modalidad_id: modalidad.id,
        };
        insert_paciente(conn, &paciente).unwrap();
        paciente
    }

    fn make_usuario(conn: &Connection) -> Usuario {
        let usuario = Usuario {
            id: Uuid::new_v4(),
            username: format!("operador-{}", Uuid::new_v4()),
            first_name: "Ana".into(),
            last_name: "Garcia".into(),
            email: "ana@example.org".into(),
            is_active: true,
            last_login: None,
            date_joined: dt("2024-01-10 09:00:00"),
        };
        insert_usuario(conn, &usuario).unwrap();
        usuario
    }

    fn make_tipo_alarma(conn: &Connection) -> TipoAlarma {
        let clasificacion = ClasificacionAlarma {
            id: Uuid::new_v4(),
            nombre: "Emergencia".into(),
            codigo: "EM".into(),
        };
        insert_clasificacion_alarma(conn, &clasificacion).unwrap();

        let tipo = TipoAlarma {
            id: Uuid::new_v4(),
            nombre: "Caida".into(),
            codigo: "EM-01".into(),
            es_dispositivo: true,
            clasificacion_id: clasificacion.id,
        };
        insert_tipo_alarma(conn, &tipo).unwrap();
        tipo
    }

    // ── Direcciones ─────────────────────────────────────────

    #[test]
    fn direccion_insert_and_retrieve() {
        let conn = test_db();
        let dir = make_direccion(&conn);
        let fetched = get_direccion(&conn, &dir.id).unwrap().unwrap();
        assert_eq!(fetched.localidad, "Springfield");
        assert_eq!(fetched.codigo_postal, "00000");
    }

    #[test]
    fn direccion_find_matches_full_field_set() {
        let conn = test_db();
        let dir = make_direccion(&conn);

        let found = find_direccion(&conn, "Springfield", "X", "123 Main St", "00000")
            .unwrap()
            .unwrap();
        assert_eq!(found.id, dir.id);

        // One differing field is not a match
        let miss = find_direccion(&conn, "Springfield", "X", "123 Main St", "99999").unwrap();
        assert!(miss.is_none());
    }

    #[test]
    fn direccion_update_and_delete() {
        let conn = test_db();
        let mut dir = make_direccion(&conn);
        dir.localidad = "Shelbyville".into();
        update_direccion(&conn, &dir).unwrap();
        assert_eq!(
            get_direccion(&conn, &dir.id).unwrap().unwrap().localidad,
            "Shelbyville"
        );

        delete_direccion(&conn, &dir.id).unwrap();
        assert!(get_direccion(&conn, &dir.id).unwrap().is_none());
    }

    #[test]
    fn direccion_delete_not_found() {
        let conn = test_db();
        assert!(delete_direccion(&conn, &Uuid::new_v4()).is_err());
    }

    // ── Personas ────────────────────────────────────────────

    #[test]
    fn persona_insert_and_retrieve() {
        let conn = test_db();
        let persona = make_persona(&conn);
        let fetched = get_persona(&conn, &persona.id).unwrap().unwrap();
        assert_eq!(fetched.nombre, "Carmen");
        assert_eq!(fetched.sexo, Sexo::Femenino);
        assert_eq!(fetched.telefono_movil, None);
        assert_eq!(fetched.direccion_id, persona.direccion_id);
    }

    #[test]
    fn persona_find_is_null_safe_on_phones() {
        let conn = test_db();
        let persona = make_persona(&conn);

        let found = find_persona(&conn, &persona).unwrap().unwrap();
        assert_eq!(found.id, persona.id);

        let mut other = persona.clone();
        other.telefono_movil = Some("600000000".into());
        assert!(find_persona(&conn, &other).unwrap().is_none());
    }

    #[test]
    fn persona_requires_existing_direccion() {
        let conn = test_db();
        let persona = Persona {
            id: Uuid::new_v4(),
            nombre: "Huerfana".into(),
            apellidos: "Sin Direccion".into(),
            dni: "00000000A".into(),
            fecha_nacimiento: NaiveDate::from_ymd_opt(1950, 1, 1).unwrap(),
            sexo: Sexo::Otro,
            telefono_fijo: None,
            telefono_movil: None,
            direccion_id: Uuid::new_v4(), // Non-existent address
        };
        assert!(insert_persona(&conn, &persona).is_err());
    }

    // ── Lookups ─────────────────────────────────────────────

    #[test]
    fn lookup_find_by_name() {
        let conn = test_db();
        let vivienda = TipoVivienda {
            id: Uuid::new_v4(),
            nombre: "Apartment".into(),
        };
        insert_tipo_vivienda(&conn, &vivienda).unwrap();

        let found = find_tipo_vivienda(&conn, "Apartment").unwrap().unwrap();
        assert_eq!(found.id, vivienda.id);
        assert!(find_tipo_vivienda(&conn, "Chalet").unwrap().is_none());
    }

    #[test]
    fn lookup_list_sorted_by_name() {
        let conn = test_db();
        for nombre in ["Temporal", "Ausente", "Vive sola"] {
            insert_tipo_situacion(
                &conn,
                &TipoSituacion {
                    id: Uuid::new_v4(),
                    nombre: nombre.into(),
                },
            )
            .unwrap();
        }
        let all = list_tipos_situacion(&conn).unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].nombre, "Ausente");
    }

    // ── Recursos comunitarios ───────────────────────────────

    #[test]
    fn recurso_chain_insert_and_retrieve() {
        let conn = test_db();
        let clasificacion = ClasificacionRecurso {
            id: Uuid::new_v4(),
            nombre: "Sanitario".into(),
        };
        insert_clasificacion_recurso(&conn, &clasificacion).unwrap();

        let tipo = TipoRecurso {
            id: Uuid::new_v4(),
            nombre: "Centro de salud".into(),
            clasificacion_id: clasificacion.id,
        };
        insert_tipo_recurso(&conn, &tipo).unwrap();

        let dir = make_direccion(&conn);
        let recurso = RecursoComunitario {
            id: Uuid::new_v4(),
            nombre: "CS Centro".into(),
            telefono: "911222333".into(),
            tipo_id: tipo.id,
            direccion_id: dir.id,
        };
        insert_recurso_comunitario(&conn, &recurso).unwrap();

        let fetched = get_recurso_comunitario(&conn, &recurso.id).unwrap().unwrap();
        assert_eq!(fetched.nombre, "CS Centro");
        assert_eq!(fetched.tipo_id, tipo.id);
        assert_eq!(fetched.direccion_id, dir.id);
    }

    #[test]
    fn tipo_recurso_find_scoped_by_clasificacion() {
        let conn = test_db();
        let c1 = ClasificacionRecurso {
            id: Uuid::new_v4(),
            nombre: "Sanitario".into(),
        };
        let c2 = ClasificacionRecurso {
            id: Uuid::new_v4(),
            nombre: "Social".into(),
        };
        insert_clasificacion_recurso(&conn, &c1).unwrap();
        insert_clasificacion_recurso(&conn, &c2).unwrap();

        let tipo = TipoRecurso {
            id: Uuid::new_v4(),
            nombre: "Centro".into(),
            clasificacion_id: c1.id,
        };
        insert_tipo_recurso(&conn, &tipo).unwrap();

        assert!(find_tipo_recurso(&conn, "Centro", &c1.id).unwrap().is_some());
        assert!(find_tipo_recurso(&conn, "Centro", &c2.id).unwrap().is_none());
    }

    // ── Terminales ──────────────────────────────────────────

    #[test]
    fn terminal_insert_and_retrieve() {
        let conn = test_db();
        let terminal = make_terminal(&conn);
        let fetched = get_terminal(&conn, &terminal.id).unwrap().unwrap();
        assert_eq!(fetched.numero_terminal, "T-0042");
        assert!(fetched.barreras_arquitectonicas);
        assert_eq!(fetched.titular_id, None);
    }

    #[test]
    fn terminal_requires_existing_lookups() {
        let conn = test_db();
        let terminal = Terminal {
            id: Uuid::new_v4(),
            numero_terminal: "T-9999".into(),
            modo_acceso_vivienda: "portal".into(),
            barreras_arquitectonicas: false,
            modelo_terminal: "NEO-3000".into(),
            fecha_tipo_situacion: None,
            titular_id: None,
            tipo_vivienda_id: Uuid::new_v4(),
            tipo_situacion_id: Uuid::new_v4(),
        };
        assert!(insert_terminal(&conn, &terminal).is_err());
    }

    #[test]
    fn terminal_titular_link_is_mutable() {
        let conn = test_db();
        let paciente = make_paciente(&conn);
        let mut terminal = make_terminal(&conn);

        terminal.titular_id = Some(paciente.id);
        update_terminal(&conn, &terminal).unwrap();
        assert_eq!(
            get_terminal(&conn, &terminal.id).unwrap().unwrap().titular_id,
            Some(paciente.id)
        );
    }

    #[test]
    fn terminal_find_full_field_match() {
        let conn = test_db();
        let terminal = make_terminal(&conn);

        let found = find_terminal(&conn, &terminal).unwrap().unwrap();
        assert_eq!(found.id, terminal.id);

        let mut other = terminal.clone();
        other.modelo_terminal = "NEO-4000".into();
        assert!(find_terminal(&conn, &other).unwrap().is_none());
    }

    // ── Pacientes ───────────────────────────────────────────

    #[test]
    fn paciente_insert_and_retrieve() {
        let conn = test_db();
        let paciente = make_paciente(&conn);
        let fetched = get_paciente(&conn, &paciente.id).unwrap().unwrap();
        assert_eq!(fetched.numero_expediente, "EXP-001");
        assert!(fetched.prestacion_otros_servicios_sociales);
        assert_eq!(
            fetched.observaciones_medicas.as_deref(),
            Some("Diabetes tipo 2")
        );
    }

    #[test]
    fn paciente_update_partial_fields_via_full_row() {
        let conn = test_db();
        let mut paciente = make_paciente(&conn);
        paciente.tiene_ucr = true;
        paciente.observaciones_medicas = None;
        update_paciente(&conn, &paciente).unwrap();

        let fetched = get_paciente(&conn, &paciente.id).unwrap().unwrap();
        assert!(fetched.tiene_ucr);
        assert!(fetched.observaciones_medicas.is_none());
        assert_eq!(fetched.numero_expediente, "EXP-001");
    }

    // ── Relaciones paciente ─────────────────────────────────

    #[test]
    fn relacion_insert_and_list_by_paciente() {
        let conn = test_db();
        let paciente = make_paciente(&conn);

        for (nombre, prioridad) in [("Luis", 2), ("Marta", 1)] {
            insert_relacion_paciente(
                &conn,
                &RelacionPaciente {
                    id: Uuid::new_v4(),
                    nombre: nombre.into(),
                    apellidos: "Lopez".into(),
                    telefono: "600111222".into(),
                    tipo_relacion: "hijo".into(),
                    tiene_llaves_vivienda: prioridad == 1,
                    disponibilidad: Some("tardes".into()),
                    observaciones: None,
                    prioridad,
                    es_conviviente: false,
                    tiempo_domicilio: Some("10 min".into()),
                    paciente_id: paciente.id,
                },
            )
            .unwrap();
        }

        let contactos = list_relaciones_por_paciente(&conn, &paciente.id).unwrap();
        assert_eq!(contactos.len(), 2);
        assert_eq!(contactos[0].nombre, "Marta"); // prioridad 1 first
    }

    #[test]
    fn deleting_paciente_cascades_relaciones() {
        let conn = test_db();
        let paciente = make_paciente(&conn);
        insert_relacion_paciente(
            &conn,
            &RelacionPaciente {
                id: Uuid::new_v4(),
                nombre: "Luis".into(),
                apellidos: "Lopez".into(),
                telefono: "600111222".into(),
                tipo_relacion: "hijo".into(),
                tiene_llaves_vivienda: false,
                disponibilidad: None,
                observaciones: None,
                prioridad: 1,
                es_conviviente: false,
                tiempo_domicilio: None,
                paciente_id: paciente.id,
            },
        )
        .unwrap();

        delete_paciente(&conn, &paciente.id).unwrap();
        let contactos = list_relaciones_por_paciente(&conn, &paciente.id).unwrap();
        assert!(contactos.is_empty());
    }

    // ── Alarmas ─────────────────────────────────────────────

    #[test]
    fn alarma_insert_and_retrieve() {
        let conn = test_db();
        let tipo = make_tipo_alarma(&conn);
        let operador = make_usuario(&conn);

        let alarma = Alarma {
            id: Uuid::new_v4(),
            estado_alarma: EstadoAlarma::Abierta,
            fecha_registro: dt("2024-03-01 10:00:00"),
            observaciones: Some("Pulsador activado".into()),
            resumen: None,
            tipo_alarma_id: tipo.id,
            teleoperador_id: operador.id,
        };
        insert_alarma(&conn, &alarma).unwrap();

        let fetched = get_alarma(&conn, &alarma.id).unwrap().unwrap();
        assert_eq!(fetched.estado_alarma, EstadoAlarma::Abierta);
        assert_eq!(fetched.fecha_registro, dt("2024-03-01 10:00:00"));
        assert_eq!(fetched.observaciones.as_deref(), Some("Pulsador activado"));
    }

    #[test]
    fn alarma_list_newest_first() {
        let conn = test_db();
        let tipo = make_tipo_alarma(&conn);
        let operador = make_usuario(&conn);

        for (ts, resumen) in [
            ("2024-03-01 08:00:00", "primera"),
            ("2024-03-01 12:00:00", "segunda"),
        ] {
            insert_alarma(
                &conn,
                &Alarma {
                    id: Uuid::new_v4(),
                    estado_alarma: EstadoAlarma::Cerrada,
                    fecha_registro: dt(ts),
                    observaciones: None,
                    resumen: Some(resumen.into()),
                    tipo_alarma_id: tipo.id,
                    teleoperador_id: operador.id,
                },
            )
            .unwrap();
        }

        let alarmas = list_alarmas(&conn).unwrap();
        assert_eq!(alarmas[0].resumen.as_deref(), Some("segunda"));
    }

    #[test]
    fn tipo_alarma_find_full_match() {
        let conn = test_db();
        let tipo = make_tipo_alarma(&conn);

        let found = find_tipo_alarma(&conn, "Caida", "EM-01", true, &tipo.clasificacion_id)
            .unwrap()
            .unwrap();
        assert_eq!(found.id, tipo.id);

        let miss =
            find_tipo_alarma(&conn, "Caida", "EM-01", false, &tipo.clasificacion_id).unwrap();
        assert!(miss.is_none());
    }

    // ── Usuarios / grupos ───────────────────────────────────

    #[test]
    fn usuario_insert_and_retrieve() {
        let conn = test_db();
        let usuario = make_usuario(&conn);
        let fetched = get_usuario(&conn, &usuario.id).unwrap().unwrap();
        assert_eq!(fetched.first_name, "Ana");
        assert!(fetched.is_active);
        assert!(fetched.last_login.is_none());
    }

    #[test]
    fn usuario_username_is_unique() {
        let conn = test_db();
        let usuario = make_usuario(&conn);
        let mut dup = usuario.clone();
        dup.id = Uuid::new_v4();
        assert!(insert_usuario(&conn, &dup).is_err());
    }

    #[test]
    fn usuario_group_membership() {
        let conn = test_db();
        let usuario = make_usuario(&conn);
        let grupo = Grupo {
            id: Uuid::new_v4(),
            nombre: "teleoperadores".into(),
        };
        insert_grupo(&conn, &grupo).unwrap();

        add_usuario_to_grupo(&conn, &usuario.id, &grupo.id).unwrap();
        let grupos = list_grupos_de_usuario(&conn, &usuario.id).unwrap();
        assert_eq!(grupos.len(), 1);
        assert_eq!(grupos[0].nombre, "teleoperadores");

        remove_usuario_from_grupo(&conn, &usuario.id, &grupo.id).unwrap();
        assert!(list_grupos_de_usuario(&conn, &usuario.id).unwrap().is_empty());
    }

    #[test]
    fn usuario_database_id_absent_then_set() {
        let conn = test_db();
        let usuario = make_usuario(&conn);

        // Absence of the extension record is a valid state
        assert!(get_usuario_database_id(&conn, &usuario.id).unwrap().is_none());

        let db_id = Uuid::new_v4();
        set_usuario_database_id(&conn, &usuario.id, &db_id).unwrap();
        assert_eq!(
            get_usuario_database_id(&conn, &usuario.id).unwrap(),
            Some(db_id)
        );
    }

    #[test]
    fn usuario_imagen_absent_is_none() {
        let conn = test_db();
        let usuario = make_usuario(&conn);
        assert!(get_usuario_imagen(&conn, &usuario.id).unwrap().is_none());
    }
}
